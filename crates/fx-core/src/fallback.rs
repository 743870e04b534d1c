//! Render-mode selection and the static substitutes used when the full
//! simulators are not allowed to run.

use rand::prelude::*;

use crate::capability::CapabilitySignal;
use crate::constants::*;

/// Which decorative effect is asking for a render mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    ParticleField,
    Orbit,
    Tilt,
    Timeline,
    Parallax,
}

impl EffectKind {
    /// Effects that rely on an accelerated surface and are replaced by a
    /// static substitute without one. Parallax is a plain CSS transform.
    pub fn needs_accelerated(self) -> bool {
        !matches!(self, EffectKind::Parallax)
    }

    /// Effects dropped entirely on compact viewports.
    pub fn omitted_when_compact(self) -> bool {
        matches!(self, EffectKind::Orbit | EffectKind::Tilt)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Run the frame-driven simulator.
    Full,
    /// Static or CSS-only substitute.
    Static,
    /// Render nothing at all.
    Omitted,
}

/// Pick how an effect renders. First matching rule wins.
pub fn select_mode(kind: EffectKind, signal: &CapabilitySignal) -> RenderMode {
    if signal.reduced_motion {
        RenderMode::Static
    } else if kind.needs_accelerated() && !signal.accelerated {
        RenderMode::Static
    } else if kind.omitted_when_compact() && signal.is_compact() {
        RenderMode::Omitted
    } else {
        RenderMode::Full
    }
}

/// Number of static markers that stand in for the particle field.
pub fn fallback_marker_count(signal: &CapabilitySignal) -> usize {
    signal.particle_count().min(FALLBACK_MARKERS_MAX)
}

/// One statically placed, CSS-animated particle marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackMarker {
    pub x_pct: f32,
    pub y_pct: f32,
    pub radius_px: f32,
    pub opacity: f32,
    pub delay_sec: f32,
    pub duration_sec: f32,
}

pub fn particle_markers(count: usize, rng: &mut impl Rng) -> Vec<FallbackMarker> {
    (0..count)
        .map(|_| {
            let delay = rng.gen::<f32>() * MARKER_DELAY_MAX_SEC;
            FallbackMarker {
                x_pct: rng.gen::<f32>() * 100.0,
                y_pct: rng.gen::<f32>() * 100.0,
                radius_px: MARKER_RADIUS_MIN_PX + rng.gen::<f32>() * MARKER_RADIUS_SPAN_PX,
                opacity: MARKER_OPACITY_MIN + rng.gen::<f32>() * MARKER_OPACITY_SPAN,
                delay_sec: delay,
                duration_sec: MARKER_BASE_DURATION_SEC + delay,
            }
        })
        .collect()
}

/// Marker layout from a seed, for hosts without their own generator.
pub fn seeded_particle_markers(count: usize, seed: u64) -> Vec<FallbackMarker> {
    particle_markers(count, &mut StdRng::seed_from_u64(seed))
}

/// Vertical pixel offsets of the static timeline markers.
pub fn timeline_marker_offsets(items: usize) -> Vec<f32> {
    (0..items)
        .map(|i| i as f32 * TIMELINE_FALLBACK_SPACING_PX)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DeviceTier, ViewportClass};

    fn signal() -> CapabilitySignal {
        CapabilitySignal {
            accelerated: true,
            reduced_motion: false,
            viewport: ViewportClass::Standard,
            tier: DeviceTier::High,
        }
    }

    #[test]
    fn reduced_motion_wins_over_everything() {
        let s = CapabilitySignal {
            reduced_motion: true,
            viewport: ViewportClass::Compact,
            ..signal()
        };
        assert_eq!(select_mode(EffectKind::Orbit, &s), RenderMode::Static);
        assert_eq!(select_mode(EffectKind::Parallax, &s), RenderMode::Static);
    }

    #[test]
    fn no_acceleration_means_static_before_compact_check() {
        let s = CapabilitySignal {
            accelerated: false,
            viewport: ViewportClass::Compact,
            ..signal()
        };
        assert_eq!(select_mode(EffectKind::Orbit, &s), RenderMode::Static);
        assert_eq!(select_mode(EffectKind::ParticleField, &s), RenderMode::Static);
        assert_eq!(select_mode(EffectKind::Parallax, &s), RenderMode::Full);
    }

    #[test]
    fn compact_omits_orbit_and_tilt_only() {
        let s = CapabilitySignal {
            viewport: ViewportClass::Compact,
            ..signal()
        };
        assert_eq!(select_mode(EffectKind::Orbit, &s), RenderMode::Omitted);
        assert_eq!(select_mode(EffectKind::Tilt, &s), RenderMode::Omitted);
        assert_eq!(select_mode(EffectKind::ParticleField, &s), RenderMode::Full);
        assert_eq!(select_mode(EffectKind::Timeline, &s), RenderMode::Full);
    }

    #[test]
    fn marker_count_is_capped_at_twenty() {
        assert_eq!(fallback_marker_count(&signal()), 20);
        let compact = CapabilitySignal {
            viewport: ViewportClass::Compact,
            ..signal()
        };
        assert_eq!(fallback_marker_count(&compact), 15);
    }

    #[test]
    fn markers_stay_in_their_ranges() {
        let mut rng = StdRng::seed_from_u64(5);
        let markers = particle_markers(20, &mut rng);
        assert_eq!(markers.len(), 20);
        for m in markers {
            assert!((0.0..100.0).contains(&m.x_pct));
            assert!((0.0..100.0).contains(&m.y_pct));
            assert!((2.0..6.0).contains(&m.radius_px));
            assert!((0.4..0.8).contains(&m.opacity));
            assert!((m.duration_sec - 6.0 - m.delay_sec).abs() < 1e-6);
        }
    }

    #[test]
    fn seeded_layout_is_stable() {
        assert_eq!(seeded_particle_markers(8, 3), seeded_particle_markers(8, 3));
    }

    #[test]
    fn timeline_markers_are_evenly_spaced() {
        assert_eq!(timeline_marker_offsets(3), vec![0.0, 60.0, 120.0]);
        assert!(timeline_marker_offsets(0).is_empty());
    }
}
