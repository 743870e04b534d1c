//! Pointer-driven card tilt.
//!
//! The pointer offset from the card's center, normalized by the card size,
//! maps linearly onto rotation and a parallax shadow. Reduced motion is passed
//! on every call so a preference change applies to the very next event.

use crate::constants::*;
use crate::visibility::Rect;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TiltState {
    /// Degrees around X; pointer below center tilts the top away.
    pub rotate_x: f32,
    /// Degrees around Y.
    pub rotate_y: f32,
    pub shadow_x: f32,
    pub shadow_y: f32,
    pub hovered: bool,
}

impl TiltState {
    pub fn is_neutral(&self) -> bool {
        self.rotate_x == 0.0 && self.rotate_y == 0.0 && self.shadow_x == 0.0 && self.shadow_y == 0.0
    }

    fn reset_motion(&mut self) {
        self.rotate_x = 0.0;
        self.rotate_y = 0.0;
        self.shadow_x = 0.0;
        self.shadow_y = 0.0;
    }
}

#[derive(Clone, Debug)]
pub struct TiltEngine {
    intensity: f32,
    shadow: f32,
    state: TiltState,
    reduced_motion: bool,
}

impl Default for TiltEngine {
    fn default() -> Self {
        Self::new(TILT_DEFAULT_INTENSITY_DEG, TILT_SHADOW_MAGNITUDE_PX)
    }
}

impl TiltEngine {
    pub fn new(intensity_deg: f32, shadow_px: f32) -> Self {
        Self {
            intensity: intensity_deg,
            shadow: shadow_px,
            state: TiltState::default(),
            reduced_motion: false,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn state(&self) -> TiltState {
        self.state
    }

    pub fn pointer_enter(&mut self, reduced_motion: bool) -> TiltState {
        self.reduced_motion = reduced_motion;
        self.state.hovered = true;
        if reduced_motion {
            self.state.reset_motion();
        }
        self.state
    }

    /// Map a pointer position (client px) over `rect` onto the tilt outputs.
    pub fn pointer_move(&mut self, rect: Rect, px: f64, py: f64, reduced_motion: bool) -> TiltState {
        self.reduced_motion = reduced_motion;
        if reduced_motion || rect.width <= 0.0 || rect.height <= 0.0 {
            self.state.reset_motion();
            return self.state;
        }
        let (cx, cy) = rect.center();
        let nx = ((px - cx) / rect.width) as f32;
        let ny = ((py - cy) / rect.height) as f32;
        if !(nx.is_finite() && ny.is_finite()) {
            self.state.reset_motion();
            return self.state;
        }
        self.state.rotate_x = ny * -self.intensity;
        self.state.rotate_y = nx * self.intensity;
        self.state.shadow_x = nx * self.shadow;
        self.state.shadow_y = ny * self.shadow;
        self.state
    }

    pub fn pointer_leave(&mut self) -> TiltState {
        self.state = TiltState::default();
        self.state
    }

    /// CSS transform for the card, or `None` when motion is suppressed.
    pub fn css_transform(&self) -> Option<String> {
        if self.reduced_motion {
            return None;
        }
        let lift = if self.state.hovered { TILT_LIFT_PX } else { 0.0 };
        Some(format!(
            "perspective({}px) rotateX({}deg) rotateY({}deg) translateZ({}px)",
            TILT_PERSPECTIVE_PX, self.state.rotate_x, self.state.rotate_y, lift
        ))
    }

    pub fn box_shadow(&self) -> String {
        let s = &self.state;
        if s.hovered && !self.reduced_motion {
            format!(
                "{}px {}px 40px rgba(0, 0, 0, 0.15), {}px {}px 20px rgba(0, 123, 255, 0.1), 0 0 0 1px rgba(255, 255, 255, 0.1)",
                s.shadow_x,
                20.0 + s.shadow_y,
                s.shadow_x * 0.5,
                10.0 + s.shadow_y * 0.5
            )
        } else {
            "0 4px 6px rgba(0, 0, 0, 0.1), 0 0 0 1px rgba(255, 255, 255, 0.05)".to_string()
        }
    }

    pub fn glare_angle(&self) -> f32 {
        TILT_GLARE_BASE_DEG + self.state.rotate_y
    }

    /// Glare overlay background; `None` while not hovered or motion is off.
    pub fn glare_gradient(&self) -> Option<String> {
        if !self.state.hovered || self.reduced_motion {
            return None;
        }
        Some(format!(
            "linear-gradient({}deg, rgba(255, 255, 255, 0.1) 0%, transparent 50%, rgba(0, 0, 0, 0.05) 100%)",
            self.glare_angle()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 100.0)
    }

    #[test]
    fn maps_offset_to_rotation_and_shadow() {
        let mut tilt = TiltEngine::default();
        tilt.pointer_enter(false);
        // right edge, bottom edge
        let s = tilt.pointer_move(card(), 300.0, 200.0, false);
        assert!((s.rotate_y - 7.5).abs() < 1e-6);
        assert!((s.rotate_x + 7.5).abs() < 1e-6);
        assert!((s.shadow_x - 10.0).abs() < 1e-6);
        assert!((s.shadow_y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn center_is_neutral() {
        let mut tilt = TiltEngine::default();
        assert!(tilt.pointer_move(card(), 200.0, 150.0, false).is_neutral());
    }

    #[test]
    fn degenerate_rect_stays_neutral() {
        let mut tilt = TiltEngine::default();
        let s = tilt.pointer_move(Rect::new(0.0, 0.0, 0.0, 50.0), 10.0, 10.0, false);
        assert!(s.is_neutral());
    }

    #[test]
    fn reduced_motion_suppresses_transform() {
        let mut tilt = TiltEngine::default();
        tilt.pointer_enter(true);
        assert!(tilt.pointer_move(card(), 0.0, 0.0, true).is_neutral());
        assert_eq!(tilt.css_transform(), None);
        assert_eq!(tilt.glare_gradient(), None);
    }

    #[test]
    fn transform_lifts_while_hovered() {
        let mut tilt = TiltEngine::default();
        tilt.pointer_enter(false);
        let css = tilt.css_transform().unwrap();
        assert!(css.starts_with("perspective(1200px)"));
        assert!(css.ends_with("translateZ(20px)"));
        tilt.pointer_leave();
        assert!(tilt.css_transform().unwrap().ends_with("translateZ(0px)"));
    }

    #[test]
    fn glare_follows_rotate_y() {
        let mut tilt = TiltEngine::default();
        tilt.pointer_enter(false);
        tilt.pointer_move(card(), 300.0, 150.0, false);
        assert!((tilt.glare_angle() - 142.5).abs() < 1e-4);
    }
}
