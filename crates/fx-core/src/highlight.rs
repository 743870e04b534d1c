//! Cross-highlighting between the orbit and the flat skill chip list.
//!
//! The orbit reports hover transitions as [`HoverEvent`]s to whatever
//! [`HoverListener`] the composing parent hands it; the parent keeps a
//! [`HighlightState`] and feeds the highlighted label back down.

use crate::constants::CHIP_DIMMED_OPACITY;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent {
    Hover(String),
    Unhover,
}

pub trait HoverListener {
    fn hover_changed(&mut self, event: HoverEvent);
}

impl<F: FnMut(HoverEvent)> HoverListener for F {
    fn hover_changed(&mut self, event: HoverEvent) {
        self(event)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightState {
    current: Option<String>,
}

impl HighlightState {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set(&mut self, label: Option<String>) {
        self.current = label;
    }

    pub fn is_highlighted(&self, label: &str) -> bool {
        self.current.as_deref() == Some(label)
    }

    /// Chip opacity: dimmed only while some other chip is highlighted.
    pub fn chip_opacity(&self, label: &str) -> f32 {
        match self.current.as_deref() {
            None => 1.0,
            Some(h) if h == label => 1.0,
            Some(_) => CHIP_DIMMED_OPACITY,
        }
    }
}

impl HoverListener for HighlightState {
    fn hover_changed(&mut self, event: HoverEvent) {
        match event {
            HoverEvent::Hover(label) => self.current = Some(label),
            HoverEvent::Unhover => self.current = None,
        }
    }
}
