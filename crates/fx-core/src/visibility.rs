//! Viewport visibility gating.
//!
//! A [`VisibilityGate`] is the per-region flag the host's intersection
//! mechanism writes to. The stage refuses to advance an effect whose gate is
//! closed.

use crate::constants::{VISIBILITY_ROOT_MARGIN_PX, VISIBILITY_THRESHOLD};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Minimum overlap fraction of the target that counts as visible.
    pub threshold: f64,
    /// Growth applied to every side of the viewport before testing.
    pub root_margin_px: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: VISIBILITY_THRESHOLD,
            root_margin_px: VISIBILITY_ROOT_MARGIN_PX,
        }
    }
}

impl ObserverOptions {
    /// CSS `rootMargin` string for an `IntersectionObserver`.
    pub fn root_margin_css(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.left - margin,
            self.top - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// Fraction of `target` inside `viewport` grown by `margin` on each side.
pub fn intersection_ratio(target: Rect, viewport: Rect, margin: f64) -> f64 {
    let root = viewport.inflate(margin);
    let w = (target.right().min(root.right()) - target.left.max(root.left)).max(0.0);
    let h = (target.bottom().min(root.bottom()) - target.top.max(root.top)).max(0.0);
    let area = target.area();
    if area <= 0.0 {
        // zero-area targets count as fully inside when they touch the root
        let touching = target.left <= root.right()
            && target.right() >= root.left
            && target.top <= root.bottom()
            && target.bottom() >= root.top;
        return if touching { 1.0 } else { 0.0 };
    }
    (w * h) / area
}

#[derive(Clone, Debug)]
pub struct VisibilityGate {
    options: ObserverOptions,
    visible: bool,
    connected: bool,
}

impl VisibilityGate {
    /// A new gate starts closed until the host reports an intersection.
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            visible: false,
            connected: true,
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    pub fn is_visible(&self) -> bool {
        self.connected && self.visible
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Record an observer sample. Ignored once disconnected.
    pub fn record(&mut self, is_intersecting: bool) {
        if self.connected {
            self.visible = is_intersecting;
        }
    }

    /// Evaluate geometry directly, for hosts without an intersection observer.
    pub fn evaluate(&mut self, target: Rect, viewport: Rect) -> bool {
        let ratio = intersection_ratio(target, viewport, self.options.root_margin_px);
        // IntersectionObserver fires "intersecting" once the ratio reaches the threshold
        self.record(ratio > 0.0 && ratio >= self.options.threshold);
        self.is_visible()
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.visible = false;
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(ObserverOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn starts_closed() {
        assert!(!VisibilityGate::default().is_visible());
    }

    #[test]
    fn margin_extends_the_viewport() {
        // 100px tall region starting 30px below the fold: only the margin reaches it
        let target = Rect::new(0.0, 830.0, 200.0, 100.0);
        let ratio = intersection_ratio(target, viewport(), 50.0);
        assert!((ratio - 0.2).abs() < 1e-9);
        assert_eq!(intersection_ratio(target, viewport(), 0.0), 0.0);
    }

    #[test]
    fn threshold_is_ten_percent() {
        let mut gate = VisibilityGate::default();
        // 5% inside the grown root
        assert!(!gate.evaluate(Rect::new(0.0, 845.0, 100.0, 100.0), viewport()));
        // 10% inside
        assert!(gate.evaluate(Rect::new(0.0, 840.0, 100.0, 100.0), viewport()));
    }

    #[test]
    fn disconnected_gate_stays_closed() {
        let mut gate = VisibilityGate::default();
        gate.record(true);
        assert!(gate.is_visible());
        gate.disconnect();
        assert!(!gate.is_visible());
        gate.record(true);
        assert!(!gate.is_visible());
    }
}
