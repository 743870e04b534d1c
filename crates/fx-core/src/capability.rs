//! Runtime capability detection.
//!
//! Environment queries go through [`CapabilityProvider`] so the browser host
//! and tests can supply their own answers. The detector probes the renderer
//! once, classifies the environment into a [`CapabilitySignal`], and applies
//! later environment changes only at the start of the next frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::constants::*;
use crate::error::{FxError, FxResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportClass {
    Compact,
    Standard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceTier {
    Low,
    High,
}

/// Classified view of the runtime environment, read-only to consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapabilitySignal {
    pub accelerated: bool,
    pub reduced_motion: bool,
    pub viewport: ViewportClass,
    pub tier: DeviceTier,
}

impl CapabilitySignal {
    /// Number of particles the field simulator should run with.
    ///
    /// The compact check wins over the tier, so a compact high-tier device
    /// still gets the compact count.
    pub fn particle_count(&self) -> usize {
        match (self.viewport, self.tier) {
            (ViewportClass::Compact, _) => PARTICLES_COMPACT,
            (ViewportClass::Standard, DeviceTier::High) => PARTICLES_HIGH_TIER,
            (ViewportClass::Standard, DeviceTier::Low) => PARTICLES_LOW_TIER,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.viewport == ViewportClass::Compact
    }
}

#[inline]
pub fn classify_viewport(width_px: f64) -> ViewportClass {
    if width_px <= COMPACT_VIEWPORT_MAX_PX {
        ViewportClass::Compact
    } else {
        ViewportClass::Standard
    }
}

#[inline]
pub fn classify_tier(logical_processors: Option<u32>, pixel_ratio: f64) -> DeviceTier {
    match logical_processors {
        Some(n) if n >= HIGH_TIER_MIN_PROCESSORS && pixel_ratio <= HIGH_TIER_MAX_PIXEL_RATIO => {
            DeviceTier::High
        }
        _ => DeviceTier::Low,
    }
}

/// True when a reported renderer string names a CPU-emulated rasterizer.
pub fn is_software_renderer(renderer: &str) -> bool {
    let lower = renderer.to_ascii_lowercase();
    SOFTWARE_RENDERER_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Host-side environment queries.
pub trait CapabilityProvider {
    /// Try to create a minimal rendering context.
    ///
    /// `Ok(Some(name))` carries the renderer identifier (empty when the host
    /// cannot report it), `Ok(None)` means no context could be created.
    fn probe_renderer(&self) -> FxResult<Option<String>>;
    fn prefers_reduced_motion(&self) -> bool;
    fn viewport_width(&self) -> f64;
    fn logical_processors(&self) -> Option<u32>;
    fn device_pixel_ratio(&self) -> f64;
}

impl<P: CapabilityProvider> CapabilityProvider for Rc<RefCell<P>> {
    fn probe_renderer(&self) -> FxResult<Option<String>> {
        self.borrow().probe_renderer()
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.borrow().prefers_reduced_motion()
    }
    fn viewport_width(&self) -> f64 {
        self.borrow().viewport_width()
    }
    fn logical_processors(&self) -> Option<u32> {
        self.borrow().logical_processors()
    }
    fn device_pixel_ratio(&self) -> f64 {
        self.borrow().device_pixel_ratio()
    }
}

/// Deterministic provider for tests and non-browser hosts.
#[derive(Debug)]
pub struct FixedEnvironment {
    pub renderer: Option<String>,
    pub context_fails: bool,
    pub reduced_motion: bool,
    pub viewport_width: f64,
    pub logical_processors: Option<u32>,
    pub pixel_ratio: f64,
    probes: Cell<u32>,
}

impl FixedEnvironment {
    /// A desktop with a hardware renderer, 8 cores and a 1.5 pixel ratio.
    pub fn accelerated() -> Self {
        Self {
            renderer: Some("ANGLE (NVIDIA GeForce GTX 1660 Direct3D11)".into()),
            context_fails: false,
            reduced_motion: false,
            viewport_width: 1280.0,
            logical_processors: Some(8),
            pixel_ratio: 1.5,
            probes: Cell::new(0),
        }
    }

    /// Same desktop, but no rendering context can be created.
    pub fn fallback() -> Self {
        Self {
            renderer: None,
            ..Self::accelerated()
        }
    }

    pub fn with_renderer(mut self, name: &str) -> Self {
        self.renderer = Some(name.to_string());
        self
    }

    pub fn with_failing_context(mut self) -> Self {
        self.context_fails = true;
        self
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    pub fn with_viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_device(mut self, processors: Option<u32>, pixel_ratio: f64) -> Self {
        self.logical_processors = processors;
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// How many times a rendering context was requested.
    pub fn probes(&self) -> u32 {
        self.probes.get()
    }
}

impl CapabilityProvider for FixedEnvironment {
    fn probe_renderer(&self) -> FxResult<Option<String>> {
        self.probes.set(self.probes.get() + 1);
        if self.context_fails {
            return Err(FxError::ContextUnavailable("context creation threw".into()));
        }
        Ok(self.renderer.clone())
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }
    fn logical_processors(&self) -> Option<u32> {
        self.logical_processors
    }
    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

/// Environment events delivered by the host between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentChange {
    Resize,
    MotionPreference,
}

#[derive(Default, Clone, Copy)]
struct Pending {
    resize: bool,
    motion: bool,
}

pub struct CapabilityDetector {
    provider: Box<dyn CapabilityProvider>,
    signal: CapabilitySignal,
    pending: Pending,
}

impl CapabilityDetector {
    pub fn new(provider: Box<dyn CapabilityProvider>) -> Self {
        let accelerated = match provider.probe_renderer() {
            Ok(Some(name)) if is_software_renderer(&name) => {
                log::info!("[capability] software renderer '{}' treated as unavailable", name);
                false
            }
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                log::debug!("[capability] renderer probe failed: {}", e);
                false
            }
        };
        let signal = read_signal(provider.as_ref(), accelerated);
        log::info!(
            "[capability] accelerated={} reduced_motion={} viewport={:?} tier={:?}",
            signal.accelerated,
            signal.reduced_motion,
            signal.viewport,
            signal.tier
        );
        Self {
            provider,
            signal,
            pending: Pending::default(),
        }
    }

    pub fn signal(&self) -> CapabilitySignal {
        self.signal
    }

    /// Record an environment change; it takes effect at the next frame.
    pub fn notify(&mut self, change: EnvironmentChange) {
        match change {
            EnvironmentChange::Resize => self.pending.resize = true,
            EnvironmentChange::MotionPreference => self.pending.motion = true,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.resize || self.pending.motion
    }

    /// Apply pending changes. Returns the new signal when it differs.
    pub fn begin_frame(&mut self) -> Option<CapabilitySignal> {
        let pending = std::mem::take(&mut self.pending);
        if !pending.resize && !pending.motion {
            return None;
        }
        let mut next = self.signal;
        if pending.resize {
            next.viewport = classify_viewport(self.provider.viewport_width());
            next.tier = classify_tier(
                self.provider.logical_processors(),
                self.provider.device_pixel_ratio(),
            );
        }
        if pending.motion {
            next.reduced_motion = self.provider.prefers_reduced_motion();
        }
        if next == self.signal {
            return None;
        }
        log::info!(
            "[capability] changed: reduced_motion={} viewport={:?} tier={:?}",
            next.reduced_motion,
            next.viewport,
            next.tier
        );
        self.signal = next;
        Some(next)
    }
}

fn read_signal(provider: &dyn CapabilityProvider, accelerated: bool) -> CapabilitySignal {
    CapabilitySignal {
        accelerated,
        reduced_motion: provider.prefers_reduced_motion(),
        viewport: classify_viewport(provider.viewport_width()),
        tier: classify_tier(provider.logical_processors(), provider.device_pixel_ratio()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_renderers_match_case_insensitively() {
        assert!(is_software_renderer("Google SwiftShader (Software)"));
        assert!(is_software_renderer("LLVMPIPE (LLVM 15.0.7, 256 bits)"));
        assert!(!is_software_renderer("Apple M1"));
        assert!(!is_software_renderer(""));
    }

    #[test]
    fn viewport_boundary_is_inclusive() {
        assert_eq!(classify_viewport(768.0), ViewportClass::Compact);
        assert_eq!(classify_viewport(769.0), ViewportClass::Standard);
    }

    #[test]
    fn tier_needs_both_cores_and_density() {
        assert_eq!(classify_tier(Some(8), 2.0), DeviceTier::High);
        assert_eq!(classify_tier(Some(16), 3.0), DeviceTier::Low);
        assert_eq!(classify_tier(Some(4), 1.0), DeviceTier::Low);
        assert_eq!(classify_tier(None, 1.0), DeviceTier::Low);
    }

    #[test]
    fn failing_context_is_unavailable_not_an_error() {
        let det = CapabilityDetector::new(Box::new(
            FixedEnvironment::accelerated().with_failing_context(),
        ));
        assert!(!det.signal().accelerated);
    }

    #[test]
    fn software_renderer_is_unavailable() {
        let det = CapabilityDetector::new(Box::new(
            FixedEnvironment::accelerated().with_renderer("llvmpipe"),
        ));
        assert!(!det.signal().accelerated);
    }

    #[test]
    fn changes_wait_for_next_frame() {
        let env = Rc::new(RefCell::new(FixedEnvironment::accelerated()));
        let mut det = CapabilityDetector::new(Box::new(env.clone()));
        assert!(!det.signal().reduced_motion);

        env.borrow_mut().reduced_motion = true;
        det.notify(EnvironmentChange::MotionPreference);
        assert!(!det.signal().reduced_motion);
        assert!(det.has_pending());

        let next = det.begin_frame().expect("signal changed");
        assert!(next.reduced_motion);
        assert!(det.begin_frame().is_none());
    }

    #[test]
    fn unchanged_environment_reports_nothing() {
        let mut det = CapabilityDetector::new(Box::new(FixedEnvironment::accelerated()));
        det.notify(EnvironmentChange::Resize);
        assert!(det.begin_frame().is_none());
    }
}
