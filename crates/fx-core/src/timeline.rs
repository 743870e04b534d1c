//! Floating markers beside the experience timeline.

use crate::constants::*;
use crate::content::TimelineItem;
use crate::error::{FxError, FxResult};
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineNode {
    pub index: usize,
    pub base_height: f32,
    pub height: f32,
    pub scale: f32,
    /// Emissive intensity, 0.2 at rest.
    pub glow: f32,
    pub hovered: bool,
}

/// Stacked vertically, first item on top, centered on the origin.
#[inline]
pub fn base_height(index: usize, count: usize) -> f32 {
    let last = count.saturating_sub(1) as f32;
    (last - index as f32) * TIMELINE_SPACING - last * TIMELINE_SPACING * 0.5
}

pub fn canvas_height_px(count: usize) -> f32 {
    (count as f32 * TIMELINE_PX_PER_ITEM).max(TIMELINE_MIN_HEIGHT_PX)
}

pub struct TimelineNodes {
    items: Vec<TimelineItem>,
    nodes: Vec<TimelineNode>,
    hovered: Option<usize>,
    sway: f32,
    theme: Theme,
}

impl TimelineNodes {
    pub fn new(items: Vec<TimelineItem>, theme: Theme) -> Self {
        let count = items.len();
        let nodes = (0..count)
            .map(|index| {
                let h = base_height(index, count);
                TimelineNode {
                    index,
                    base_height: h,
                    height: h,
                    scale: 1.0,
                    glow: TIMELINE_IDLE_GLOW,
                    hovered: false,
                }
            })
            .collect();
        Self {
            items,
            nodes,
            hovered: None,
            sway: 0.0,
            theme,
        }
    }

    pub fn nodes(&self) -> &[TimelineNode] {
        &self.nodes
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Group rotation around Z, radians.
    pub fn sway(&self) -> f32 {
        self.sway
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Item under the pointer, if any, for the tooltip.
    pub fn hovered_item(&self) -> Option<&TimelineItem> {
        self.hovered.and_then(|i| self.items.get(i))
    }

    pub fn canvas_height_px(&self) -> f32 {
        canvas_height_px(self.len())
    }

    /// Returns true when the hovered node changed.
    pub fn hover(&mut self, index: Option<usize>) -> bool {
        let index = index.filter(|&i| i < self.nodes.len());
        if index == self.hovered {
            return false;
        }
        self.hovered = index;
        for node in &mut self.nodes {
            node.hovered = Some(node.index) == index;
        }
        true
    }

    pub fn leave(&mut self) -> bool {
        self.hover(None)
    }

    pub fn advance(&mut self, t: f32) -> FxResult<()> {
        if !t.is_finite() {
            return Err(FxError::NonFinite("timeline clock"));
        }
        for node in &mut self.nodes {
            node.height = node.base_height + (t + node.index as f32).sin() * TIMELINE_BOB_AMPLITUDE;
            if node.hovered {
                node.glow = (t * TIMELINE_GLOW_RATE).sin() * TIMELINE_GLOW_SPAN + TIMELINE_GLOW_BASE;
                node.scale = 1.0 + (t * TIMELINE_PULSE_RATE).sin() * TIMELINE_PULSE_AMPLITUDE;
            } else {
                node.glow = TIMELINE_IDLE_GLOW;
                node.scale = 1.0;
            }
        }
        self.sway = (t * TIMELINE_SWAY_RATE).sin() * TIMELINE_SWAY_AMPLITUDE;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<TimelineItem> {
        (0..n)
            .map(|i| TimelineItem {
                title: format!("Role {}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn layout_is_centered_first_on_top() {
        let heights: Vec<f32> = (0..3).map(|i| base_height(i, 3)).collect();
        assert_eq!(heights, vec![1.5, 0.0, -1.5]);
        assert_eq!(base_height(0, 1), 0.0);
    }

    #[test]
    fn canvas_has_a_floor() {
        assert_eq!(canvas_height_px(0), 300.0);
        assert_eq!(canvas_height_px(2), 300.0);
        assert_eq!(canvas_height_px(5), 500.0);
    }

    #[test]
    fn hovered_node_pulses_others_rest() {
        let mut tl = TimelineNodes::new(items(3), Theme::Light);
        assert!(tl.hover(Some(1)));
        assert!(!tl.hover(Some(1)));
        let t = std::f32::consts::PI / 6.0;
        tl.advance(t).unwrap();
        let n = tl.nodes();
        assert!((n[1].glow - 1.0).abs() < 1e-5);
        assert!((n[1].scale - (1.0 + (2.0 * t).sin() * 0.1)).abs() < 1e-6);
        assert_eq!(n[0].glow, TIMELINE_IDLE_GLOW);
        assert_eq!(n[0].scale, 1.0);
        assert_eq!(tl.hovered_item().map(|i| i.title.as_str()), Some("Role 1"));

        assert!(tl.leave());
        tl.advance(t).unwrap();
        assert_eq!(tl.nodes()[1].glow, TIMELINE_IDLE_GLOW);
    }

    #[test]
    fn out_of_range_hover_is_ignored() {
        let mut tl = TimelineNodes::new(items(2), Theme::Dark);
        assert!(!tl.hover(Some(5)));
        assert_eq!(tl.hovered(), None);
    }
}
