// Capability probing, tier policy and render-mode selection against fake environments.

use std::cell::RefCell;
use std::rc::Rc;

use fx_core::fallback::{fallback_marker_count, particle_markers};
use fx_core::{
    select_mode, CapabilityDetector, DeviceTier, EffectKind, EnvironmentChange,
    FixedEnvironment, RenderMode, ViewportClass,
};
use rand::prelude::*;

fn detect(env: FixedEnvironment) -> CapabilityDetector {
    CapabilityDetector::new(Box::new(env))
}

#[test]
fn eight_cores_at_one_point_five_is_high_tier() {
    let det = detect(FixedEnvironment::accelerated().with_device(Some(8), 1.5));
    let s = det.signal();
    assert_eq!(s.tier, DeviceTier::High);
    assert_eq!(s.particle_count(), 40);
}

#[test]
fn four_cores_is_low_tier() {
    let det = detect(FixedEnvironment::accelerated().with_device(Some(4), 1.0));
    let s = det.signal();
    assert_eq!(s.tier, DeviceTier::Low);
    assert_eq!(s.particle_count(), 25);
}

#[test]
fn compact_viewport_wins_over_tier() {
    for (cores, ratio) in [(Some(8), 1.5), (Some(4), 1.0), (None, 3.0)] {
        let det = detect(
            FixedEnvironment::accelerated()
                .with_viewport_width(500.0)
                .with_device(cores, ratio),
        );
        assert_eq!(det.signal().viewport, ViewportClass::Compact);
        assert_eq!(det.signal().particle_count(), 15);
    }
}

#[test]
fn unavailable_renderer_selects_fallback_after_one_probe() {
    let env = Rc::new(RefCell::new(FixedEnvironment::fallback()));
    let mut det = CapabilityDetector::new(Box::new(env.clone()));
    let signal = det.signal();
    assert!(!signal.accelerated);
    for kind in [
        EffectKind::ParticleField,
        EffectKind::Orbit,
        EffectKind::Tilt,
        EffectKind::Timeline,
    ] {
        assert_eq!(select_mode(kind, &signal), RenderMode::Static);
    }

    // environment changes never re-probe the renderer
    env.borrow_mut().viewport_width = 600.0;
    det.notify(EnvironmentChange::Resize);
    det.notify(EnvironmentChange::MotionPreference);
    det.begin_frame();
    assert_eq!(env.borrow().probes(), 1);
}

#[test]
fn throwing_context_is_treated_as_unavailable() {
    let env = Rc::new(RefCell::new(
        FixedEnvironment::accelerated().with_failing_context(),
    ));
    let det = CapabilityDetector::new(Box::new(env.clone()));
    assert!(!det.signal().accelerated);
    assert_eq!(env.borrow().probes(), 1);
}

#[test]
fn resize_reclassifies_at_next_frame() {
    let env = Rc::new(RefCell::new(FixedEnvironment::accelerated()));
    let mut det = CapabilityDetector::new(Box::new(env.clone()));
    assert_eq!(det.signal().particle_count(), 40);

    env.borrow_mut().viewport_width = 400.0;
    assert_eq!(det.signal().particle_count(), 40);
    det.notify(EnvironmentChange::Resize);
    let next = det.begin_frame().unwrap();
    assert_eq!(next.viewport, ViewportClass::Compact);
    assert_eq!(det.signal().particle_count(), 15);
}

#[test]
fn fallback_markers_follow_policy_count() {
    let det = detect(FixedEnvironment::fallback().with_viewport_width(500.0));
    let n = fallback_marker_count(&det.signal());
    assert_eq!(n, 15);
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(particle_markers(n, &mut rng).len(), 15);
}
