//! Skill badges orbiting a central hub.
//!
//! Nodes sit on a ring, each with its own angular speed so they drift out of
//! step. Highlighting comes from two places: the label the parent designates
//! and the node the pointer is over. Hover transitions are reported to a
//! [`HoverListener`] so sibling UI can mirror them.

use std::f32::consts::TAU;

use glam::{Mat3, Vec2, Vec3};
use smallvec::SmallVec;

use crate::constants::*;
use crate::content::SkillGroups;
use crate::error::{FxError, FxResult};
use crate::highlight::{HoverEvent, HoverListener};
use crate::theme::Theme;

/// Pick orbit labels: up to two per category, at most eight overall.
pub fn select_labels(groups: &SkillGroups) -> Vec<String> {
    groups
        .groups()
        .iter()
        .flat_map(|g| g.skills.iter().take(ORBIT_PER_CATEGORY))
        .take(ORBIT_MAX_NODES)
        .cloned()
        .collect()
}

#[inline]
pub fn base_angle(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    index as f32 / total as f32 * TAU
}

#[inline]
pub fn angular_speed(index: usize) -> f32 {
    ORBIT_BASE_SPEED + (index % 3) as f32 * ORBIT_SPEED_STEP
}

/// Unit-circle placement of `n` nodes at their base angles, for static layouts.
pub fn ring_layout(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let a = base_angle(i, n);
            Vec2::new(a.cos(), a.sin())
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitNode {
    pub label: String,
    pub index: usize,
    pub base_angle: f32,
    pub speed: f32,
    pub highlighted: bool,
    pub scale: f32,
    pub position: Vec3,
}

impl OrbitNode {
    pub fn base_angle_degrees(&self) -> f32 {
        self.base_angle.to_degrees()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hub {
    pub scale: f32,
    pub spin: f32,
}

pub struct OrbitEngine {
    nodes: SmallVec<[OrbitNode; ORBIT_MAX_NODES]>,
    radius: f32,
    external: Option<String>,
    hovered: Option<usize>,
    hub: Hub,
    scene_spin: f32,
    theme: Theme,
}

impl OrbitEngine {
    /// Build from a label list; anything past the eighth label is dropped.
    pub fn new<I, S>(labels: I, radius: f32, theme: Theme) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .take(ORBIT_MAX_NODES)
            .map(Into::into)
            .collect();
        let total = labels.len();
        let nodes = labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| {
                let base = base_angle(index, total);
                OrbitNode {
                    label,
                    index,
                    base_angle: base,
                    speed: angular_speed(index),
                    highlighted: false,
                    scale: 1.0,
                    position: Vec3::new(radius * base.cos(), 0.0, radius * base.sin()),
                }
            })
            .collect();
        Self {
            nodes,
            radius,
            external: None,
            hovered: None,
            hub: Hub {
                scale: 1.0,
                spin: 0.0,
            },
            scene_spin: 0.0,
            theme,
        }
    }

    pub fn from_groups(groups: &SkillGroups, radius: f32, theme: Theme) -> Self {
        Self::new(select_labels(groups), radius, theme)
    }

    pub fn nodes(&self) -> &[OrbitNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn hub(&self) -> Hub {
        self.hub
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Slow spin of the whole constellation around Y, in radians.
    pub fn scene_spin(&self) -> f32 {
        self.scene_spin
    }

    /// Node position after the constellation spin is applied.
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        let node = self.nodes.get(index)?;
        Some(Mat3::from_rotation_y(self.scene_spin) * node.position)
    }

    /// Node positions at their base angles, without motion.
    pub fn static_layout(&self) -> Vec<Vec3> {
        self.nodes
            .iter()
            .map(|n| Vec3::new(self.radius * n.base_angle.cos(), 0.0, self.radius * n.base_angle.sin()))
            .collect()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn any_highlighted(&self) -> bool {
        self.nodes.iter().any(|n| n.highlighted)
    }

    /// Label designated by the parent. Every node carrying it lights up;
    /// unknown labels light up nothing.
    pub fn set_highlighted(&mut self, label: Option<&str>) {
        self.external = label.map(str::to_string);
        self.refresh_flags();
    }

    /// Move the pointer onto `target` (or off every node with `None`).
    pub fn hover(&mut self, target: Option<usize>, listener: &mut dyn HoverListener) {
        let target = target.filter(|&i| i < self.nodes.len());
        if target == self.hovered {
            return;
        }
        if self.hovered.take().is_some() {
            listener.hover_changed(HoverEvent::Unhover);
        }
        if let Some(i) = target {
            self.hovered = Some(i);
            log::debug!("[orbit] hover '{}'", self.nodes[i].label);
            listener.hover_changed(HoverEvent::Hover(self.nodes[i].label.clone()));
        }
        self.refresh_flags();
    }

    fn refresh_flags(&mut self) {
        let external = self.external.as_deref();
        for node in &mut self.nodes {
            node.highlighted =
                external == Some(node.label.as_str()) || self.hovered == Some(node.index);
        }
    }

    /// Advance to `t` seconds after mount.
    pub fn advance(&mut self, t: f32) -> FxResult<()> {
        if !t.is_finite() {
            return Err(FxError::NonFinite("orbit clock"));
        }
        for node in &mut self.nodes {
            let angle = node.base_angle + t * node.speed;
            node.position = Vec3::new(
                self.radius * angle.cos(),
                (t + node.index as f32).sin() * ORBIT_BOB_AMPLITUDE,
                self.radius * angle.sin(),
            );
            let target = if node.highlighted { HIGHLIGHT_SCALE } else { 1.0 };
            node.scale += (target - node.scale) * SCALE_SMOOTHING;
        }
        self.hub.scale = if self.any_highlighted() {
            (t * HUB_PULSE_RATE).sin() * HUB_PULSE_AMPLITUDE + 1.0
        } else {
            self.hub.scale + (1.0 - self.hub.scale) * SCALE_SMOOTHING
        };
        self.hub.spin = t * HUB_SPIN_RATE;
        self.scene_spin = t * SCENE_SPIN_RATE;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(labels: &[&str]) -> OrbitEngine {
        OrbitEngine::new(labels.iter().copied(), ORBIT_RADIUS, Theme::Light)
    }

    #[test]
    fn empty_label_list_is_valid() {
        let mut e = engine(&[]);
        assert!(e.is_empty());
        e.advance(1.0).unwrap();
        assert_eq!(e.hub().scale, 1.0);
    }

    #[test]
    fn nodes_stay_on_the_ring() {
        let mut e = engine(&["a", "b", "c", "d"]);
        e.advance(3.7).unwrap();
        for n in e.nodes() {
            let r = (n.position.x * n.position.x + n.position.z * n.position.z).sqrt();
            assert!((r - ORBIT_RADIUS).abs() < 1e-4);
            assert!(n.position.y.abs() <= ORBIT_BOB_AMPLITUDE + 1e-6);
        }
    }

    #[test]
    fn hover_transitions_emit_leave_then_enter() {
        let mut e = engine(&["Rust", "Go"]);
        let mut events = Vec::new();
        let mut sink = |ev: HoverEvent| events.push(ev);
        e.hover(Some(0), &mut sink);
        e.hover(Some(0), &mut sink);
        e.hover(Some(1), &mut sink);
        e.hover(None, &mut sink);
        e.hover(Some(9), &mut sink);
        assert_eq!(
            events,
            vec![
                HoverEvent::Hover("Rust".into()),
                HoverEvent::Unhover,
                HoverEvent::Hover("Go".into()),
                HoverEvent::Unhover,
            ]
        );
    }

    #[test]
    fn highlighted_node_grows_toward_target() {
        let mut e = engine(&["Rust", "Go", "Java"]);
        e.set_highlighted(Some("Go"));
        for frame in 0..200 {
            e.advance(frame as f32 / 60.0).unwrap();
        }
        assert!((e.nodes()[1].scale - HIGHLIGHT_SCALE).abs() < 1e-3);
        assert!((e.nodes()[0].scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hub_relaxes_after_highlight_clears() {
        let mut e = engine(&["Rust"]);
        e.set_highlighted(Some("Rust"));
        e.advance(0.25 * std::f32::consts::PI).unwrap();
        assert!((e.hub().scale - 1.1).abs() < 1e-5);

        e.set_highlighted(None);
        e.advance(1.0).unwrap();
        assert!((e.hub().scale - 1.09).abs() < 1e-5);
    }

    #[test]
    fn unknown_external_label_highlights_nothing() {
        let mut e = engine(&["Rust"]);
        e.set_highlighted(Some("Cobol"));
        assert!(!e.any_highlighted());
    }

    #[test]
    fn repeated_label_lights_every_copy() {
        let mut e = engine(&["Rust", "Go", "Rust"]);
        e.set_highlighted(Some("Rust"));
        let lit: Vec<bool> = e.nodes().iter().map(|n| n.highlighted).collect();
        assert_eq!(lit, vec![true, false, true]);

        e.set_highlighted(None);
        assert!(!e.any_highlighted());
    }

    #[test]
    fn ring_layout_is_unit_radius() {
        for p in ring_layout(5) {
            assert!((p.length() - 1.0).abs() < 1e-6);
        }
    }
}
