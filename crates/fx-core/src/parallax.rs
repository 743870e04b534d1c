//! Scroll-linked vertical offset for page sections.

use crate::constants::PARALLAX_MAX_OFFSET_PX;

/// How far a section has travelled through the viewport.
///
/// 0 when its top edge meets the viewport bottom, 1 when its bottom edge
/// meets the viewport top.
pub fn scroll_progress(section_top: f64, section_height: f64, viewport_height: f64) -> f32 {
    let span = viewport_height + section_height;
    if span <= 0.0 || !span.is_finite() || !section_top.is_finite() {
        return 0.0;
    }
    (((viewport_height - section_top) / span) as f32).clamp(0.0, 1.0)
}

/// Vertical offset in px, moving from `+max` to `-max` as progress runs 0 to 1.
pub fn offset(progress: f32, strength: f32, reduced_motion: bool) -> f32 {
    if reduced_motion {
        return 0.0;
    }
    let max = PARALLAX_MAX_OFFSET_PX * strength;
    let p = progress.clamp(0.0, 1.0);
    max + (-max - max) * p
}

#[derive(Clone, Copy, Debug)]
pub struct Parallax {
    strength: f32,
}

impl Parallax {
    pub fn new(strength: f32) -> Self {
        Self {
            strength: strength.clamp(0.0, 1.0),
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// CSS transform for the section at its current scroll position.
    pub fn css_transform(
        &self,
        section_top: f64,
        section_height: f64,
        viewport_height: f64,
        reduced_motion: bool,
    ) -> Option<String> {
        if reduced_motion {
            return None;
        }
        let p = scroll_progress(section_top, section_height, viewport_height);
        Some(format!("translateY({}px)", offset(p, self.strength, false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_spans_entry_to_exit() {
        assert_eq!(scroll_progress(800.0, 400.0, 800.0), 0.0);
        assert_eq!(scroll_progress(-400.0, 400.0, 800.0), 1.0);
        assert!((scroll_progress(200.0, 400.0, 800.0) - 0.5).abs() < 1e-6);
        // clamped outside the window
        assert_eq!(scroll_progress(2000.0, 400.0, 800.0), 0.0);
    }

    #[test]
    fn offset_is_bounded_by_strength() {
        assert_eq!(offset(0.0, 0.5, false), 10.0);
        assert_eq!(offset(1.0, 0.5, false), -10.0);
        assert_eq!(offset(0.5, 1.0, false), 0.0);
        for i in 0..=20 {
            assert!(offset(i as f32 / 20.0, 1.0, false).abs() <= PARALLAX_MAX_OFFSET_PX);
        }
    }

    #[test]
    fn reduced_motion_pins_offset() {
        assert_eq!(offset(0.0, 1.0, true), 0.0);
        assert_eq!(Parallax::new(0.5).css_transform(0.0, 100.0, 800.0, true), None);
    }
}
