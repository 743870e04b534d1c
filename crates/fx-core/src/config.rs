//! Runtime configuration for the effects layer.
//!
//! Every field falls back to the matching tuning constant, so an empty JSON
//! object (or no config at all) yields the stock behaviour.

use serde::Deserialize;

use crate::constants::*;
use crate::error::{FxError, FxResult};
use crate::visibility::ObserverOptions;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FxConfig {
    /// Seed for particle placement and jitter. `None` picks one at mount.
    pub seed: Option<u64>,
    pub tilt_intensity_deg: f32,
    pub tilt_shadow_px: f32,
    pub parallax_strength: f32,
    pub orbit_radius: f32,
    pub visibility_threshold: f64,
    pub visibility_margin_px: f64,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tilt_intensity_deg: TILT_DEFAULT_INTENSITY_DEG,
            tilt_shadow_px: TILT_SHADOW_MAGNITUDE_PX,
            parallax_strength: PARALLAX_DEFAULT_STRENGTH,
            orbit_radius: ORBIT_RADIUS,
            visibility_threshold: VISIBILITY_THRESHOLD,
            visibility_margin_px: VISIBILITY_ROOT_MARGIN_PX,
        }
    }
}

impl FxConfig {
    /// Parse and validate a JSON config. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> FxResult<Self> {
        let config: FxConfig =
            serde_json::from_str(json).map_err(|e| FxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FxResult<()> {
        let finite = [
            self.tilt_intensity_deg,
            self.tilt_shadow_px,
            self.parallax_strength,
            self.orbit_radius,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite || !self.visibility_margin_px.is_finite() {
            return Err(FxError::Config("values must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(FxError::Config(format!(
                "visibility_threshold {} outside 0..=1",
                self.visibility_threshold
            )));
        }
        if self.orbit_radius <= 0.0 {
            return Err(FxError::Config("orbit_radius must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.parallax_strength) {
            return Err(FxError::Config(format!(
                "parallax_strength {} outside 0..=1",
                self.parallax_strength
            )));
        }
        Ok(())
    }

    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.visibility_threshold,
            root_margin_px: self.visibility_margin_px,
        }
    }
}
