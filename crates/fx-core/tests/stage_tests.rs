// End-to-end frame scheduling: gating, fallback, environment changes and isolation.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use fx_core::{
    CapabilityDetector, Effect, EffectSpec, EnvironmentChange, FixedEnvironment, FxConfig,
    HighlightState, HoverEvent, HoverListener, RenderMode, Stage, Theme, TimelineItem,
};

const FRAME: f64 = 1.0 / 60.0;

fn shared(env: FixedEnvironment) -> (Rc<RefCell<FixedEnvironment>>, CapabilityDetector) {
    let env = Rc::new(RefCell::new(env));
    let det = CapabilityDetector::new(Box::new(env.clone()));
    (env, det)
}

fn particles(seed: u64) -> EffectSpec {
    EffectSpec::Particles {
        theme: Theme::Dark,
        seed,
    }
}

fn orbit(labels: &[&str]) -> EffectSpec {
    EffectSpec::Orbit {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        radius: 3.0,
        theme: Theme::Light,
    }
}

fn particle_count(stage: &Stage, id: u32) -> Option<usize> {
    match stage.effect(id) {
        Some(Effect::Particles(field)) => Some(field.len()),
        _ => None,
    }
}

#[test]
fn fallback_environment_never_builds_a_simulator() {
    let (env, mut det) = shared(FixedEnvironment::fallback());
    let mut stage = Stage::default();
    let p = stage.mount(particles(1), 0.0, &det.signal());
    let o = stage.mount(orbit(&["Rust"]), 0.0, &det.signal());
    stage.record_visibility(p, true).unwrap();
    stage.record_visibility(o, true).unwrap();

    for frame in 0..120 {
        let report = stage.tick(frame as f64 * FRAME, &mut det);
        assert_eq!(report.advanced, 0);
    }
    assert_eq!(stage.mode(p), Some(RenderMode::Static));
    assert_eq!(stage.mode(o), Some(RenderMode::Static));
    assert_eq!(stage.simulators_built(), 0);
    assert_eq!(env.borrow().probes(), 1);
    assert!(!stage.has_active());
}

#[test]
fn compact_viewport_omits_orbit_but_runs_particles() {
    let (_env, mut det) = shared(FixedEnvironment::accelerated().with_viewport_width(500.0));
    let mut stage = Stage::default();
    let p = stage.mount(particles(2), 0.0, &det.signal());
    let o = stage.mount(orbit(&["Rust", "Go"]), 0.0, &det.signal());
    stage.record_visibility(p, true).unwrap();

    assert_eq!(stage.mode(o), Some(RenderMode::Omitted));
    assert_eq!(particle_count(&stage, p), Some(15));
    assert_eq!(stage.tick(FRAME, &mut det).advanced, 1);
}

#[test]
fn reduced_motion_change_applies_at_next_frame() {
    let (env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(particles(3), 0.0, &det.signal());
    stage.record_visibility(id, true).unwrap();
    assert_eq!(stage.tick(FRAME, &mut det).advanced, 1);

    env.borrow_mut().reduced_motion = true;
    det.notify(EnvironmentChange::MotionPreference);
    // nothing changes until the stage ticks
    assert_eq!(stage.mode(id), Some(RenderMode::Full));

    let report = stage.tick(2.0 * FRAME, &mut det);
    assert_eq!(report.advanced, 0);
    assert_eq!(report.mode_changes.len(), 1);
    assert_eq!(report.mode_changes[0].to, RenderMode::Static);
    assert!(stage.effect(id).is_none());

    env.borrow_mut().reduced_motion = false;
    det.notify(EnvironmentChange::MotionPreference);
    let report = stage.tick(3.0 * FRAME, &mut det);
    assert_eq!(report.advanced, 1);
    assert_eq!(stage.mode(id), Some(RenderMode::Full));
}

#[test]
fn resize_rebuilds_field_with_new_count() {
    let (env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(particles(4), 0.0, &det.signal());
    assert_eq!(particle_count(&stage, id), Some(40));

    env.borrow_mut().viewport_width = 600.0;
    det.notify(EnvironmentChange::Resize);
    let report = stage.tick(FRAME, &mut det);
    assert!(report.mode_changes.is_empty());
    assert_eq!(particle_count(&stage, id), Some(15));
    assert_eq!(stage.simulators_built(), 2);
}

#[test]
fn hidden_effects_do_not_move() {
    let (_env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(particles(5), 0.0, &det.signal());
    let before = match stage.effect(id) {
        Some(Effect::Particles(f)) => f.positions_flat().to_vec(),
        _ => panic!("field not built"),
    };
    for frame in 1..60 {
        stage.tick(frame as f64 * FRAME, &mut det);
    }
    let after = match stage.effect(id) {
        Some(Effect::Particles(f)) => f.positions_flat().to_vec(),
        _ => panic!("field not built"),
    };
    assert_eq!(before, after);

    stage.record_visibility(id, true).unwrap();
    stage.record_visibility(id, false).unwrap();
    assert_eq!(stage.tick(2.0, &mut det).advanced, 0);
}

#[test]
fn unmount_stops_work_synchronously() {
    let (_env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(particles(6), 0.0, &det.signal());
    stage.record_visibility(id, true).unwrap();
    stage.unmount(id).unwrap();
    assert!(stage.is_empty());
    assert!(!stage.has_active());
    assert_eq!(stage.tick(FRAME, &mut det).advanced, 0);
    assert!(stage.record_visibility(id, true).is_err());
}

#[test]
fn one_failing_effect_does_not_stop_the_others() {
    let (_env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let a = stage.mount(particles(7), 0.0, &det.signal());
    let b = stage.mount(orbit(&["Rust"]), f64::NEG_INFINITY, &det.signal());
    stage.record_visibility(a, true).unwrap();
    stage.record_visibility(b, true).unwrap();

    let report = stage.tick(FRAME, &mut det);
    assert_eq!(report.advanced, 1);
    assert_eq!(report.failed.as_slice(), &[b]);
    assert_eq!(stage.len(), 2);
}

#[test]
fn orbit_hover_reaches_the_parent_listener() {
    let (_env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(orbit(&["Rust", "Go"]), 0.0, &det.signal());
    stage.record_visibility(id, true).unwrap();

    let mut chips = HighlightState::default();
    stage.hover_orbit(id, Some(1), &mut chips).unwrap();
    assert_eq!(chips.current(), Some("Go"));
    stage.set_highlighted(id, chips.current()).unwrap();

    for frame in 1..=120 {
        stage.tick(frame as f64 * FRAME, &mut det);
    }
    let Some(Effect::Orbit(engine)) = stage.effect(id) else {
        panic!("orbit not built");
    };
    assert_abs_diff_eq!(engine.nodes()[1].scale, 1.3, epsilon = 1e-3);
}

#[test]
fn compact_resize_ends_an_orbit_hover() {
    let (env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(orbit(&["Rust", "Go", "Python"]), 0.0, &det.signal());
    stage.record_visibility(id, true).unwrap();

    let mut chips = HighlightState::default();
    stage.hover_orbit(id, Some(1), &mut chips).unwrap();
    stage.set_highlighted(id, chips.current()).unwrap();
    assert_eq!(chips.current(), Some("Go"));

    env.borrow_mut().viewport_width = 500.0;
    det.notify(EnvironmentChange::Resize);
    let report = stage.tick(FRAME, &mut det);
    assert_eq!(stage.mode(id), Some(RenderMode::Omitted));
    assert_eq!(report.hover_ended.as_slice(), &[id]);
    for _ in &report.hover_ended {
        chips.hover_changed(HoverEvent::Unhover);
    }
    assert_eq!(chips.current(), None);

    // a late pointerleave finds no orbit and changes nothing
    stage.hover_orbit(id, None, &mut chips).unwrap();
    assert_eq!(chips.current(), None);

    env.borrow_mut().viewport_width = 1280.0;
    det.notify(EnvironmentChange::Resize);
    let report = stage.tick(2.0 * FRAME, &mut det);
    assert!(report.hover_ended.is_empty());
    let Some(Effect::Orbit(engine)) = stage.effect(id) else {
        panic!("orbit not rebuilt");
    };
    assert!(!engine.any_highlighted());
    assert_eq!(engine.hovered(), None);
}

#[test]
fn teardown_keeps_a_label_the_page_designated() {
    let (env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let id = stage.mount(orbit(&["Rust", "Go"]), 0.0, &det.signal());
    stage.set_highlighted(id, Some("Rust")).unwrap();

    env.borrow_mut().reduced_motion = true;
    det.notify(EnvironmentChange::MotionPreference);
    let report = stage.tick(FRAME, &mut det);
    assert!(report.hover_ended.is_empty());

    env.borrow_mut().reduced_motion = false;
    det.notify(EnvironmentChange::MotionPreference);
    stage.tick(2.0 * FRAME, &mut det);
    let Some(Effect::Orbit(engine)) = stage.effect(id) else {
        panic!("orbit not rebuilt");
    };
    assert!(engine.nodes()[0].highlighted);
    assert!(!engine.nodes()[1].highlighted);
}

#[test]
fn timeline_mounts_from_items() {
    let (_env, mut det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::default();
    let items: Vec<TimelineItem> = serde_json::from_str(
        r#"[{ "title": "Engineer", "period": "2022" }, { "title": "Intern", "period": "2020" }]"#,
    )
    .unwrap();
    let id = stage.mount(
        EffectSpec::Timeline {
            items,
            theme: Theme::Dark,
        },
        0.0,
        &det.signal(),
    );
    stage.record_visibility(id, true).unwrap();
    stage.tick(1.0, &mut det);
    let Some(Effect::Timeline(tl)) = stage.effect(id) else {
        panic!("timeline not built");
    };
    assert_abs_diff_eq!(tl.nodes()[0].base_height, 0.75);
    assert_abs_diff_eq!(tl.nodes()[0].height, 0.75 + 1.0f32.sin() * 0.1, epsilon = 1e-6);
}

#[test]
fn config_threshold_reaches_new_gates() {
    let cfg = FxConfig::from_json(r#"{ "visibility_threshold": 0.5 }"#).unwrap();
    let (_env, det) = shared(FixedEnvironment::accelerated());
    let mut stage = Stage::new(cfg.observer_options());
    let id = stage.mount(particles(8), 0.0, &det.signal());
    assert_abs_diff_eq!(stage.gate(id).unwrap().options().threshold, 0.5);
}
