//! Two-valued page theme and the palette each effect draws with.
//!
//! The theme only ever picks colors; no simulator branches on it.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse the page's theme token. Anything but `"dark"` is light.
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn particle_color(self) -> &'static str {
        match self {
            Theme::Dark => "#ffffff",
            Theme::Light => "#007bff",
        }
    }

    pub fn badge_color(self, highlighted: bool) -> &'static str {
        match (self, highlighted) {
            (Theme::Dark, true) => "#74b9ff",
            (Theme::Light, true) => "#0984e3",
            (Theme::Dark, false) => "#4a90e2",
            (Theme::Light, false) => "#007bff",
        }
    }

    pub fn hub_color(self) -> &'static str {
        self.particle_color()
    }

    pub fn label_color(self) -> &'static str {
        "#ffffff"
    }

    pub fn timeline_color(self) -> &'static str {
        self.particle_color()
    }

    pub fn timeline_glow(self) -> &'static str {
        match self {
            Theme::Dark => "#4a90e2",
            Theme::Light => "#0056b3",
        }
    }

    /// Outer halo drawn around each timeline node.
    pub fn timeline_ring(self) -> &'static str {
        match self {
            Theme::Dark => "#4a90e2",
            Theme::Light => "#007bff",
        }
    }

    /// Gradient stops for the static timeline markers.
    pub fn timeline_fallback_gradient(self) -> (&'static str, &'static str) {
        match self {
            Theme::Dark => ("#4a90e2", "#74b9ff"),
            Theme::Light => ("#007bff", "#0984e3"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tokens_fall_back_to_light() {
        assert_eq!(Theme::from_token("dark"), Theme::Dark);
        assert_eq!(Theme::from_token("DARK"), Theme::Dark);
        assert_eq!(Theme::from_token("sepia"), Theme::Light);
        assert_eq!(Theme::from_token(""), Theme::Light);
    }
}
