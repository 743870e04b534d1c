pub mod camera;
pub mod capability;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod fallback;
pub mod highlight;
pub mod orbit;
pub mod parallax;
pub mod particles;
pub mod stage;
pub mod theme;
pub mod tilt;
pub mod timeline;
pub mod visibility;

pub use capability::{
    CapabilityDetector, CapabilityProvider, CapabilitySignal, DeviceTier, EnvironmentChange,
    FixedEnvironment, ViewportClass,
};
pub use config::FxConfig;
pub use content::{PortfolioContent, SkillGroup, SkillGroups, TimelineItem};
pub use error::{FxError, FxResult};
pub use fallback::{select_mode, EffectKind, FallbackMarker, RenderMode};
pub use highlight::{HighlightState, HoverEvent, HoverListener};
pub use orbit::{OrbitEngine, OrbitNode};
pub use particles::{Particle, ParticleField};
pub use stage::{Effect, EffectId, EffectSpec, FrameReport, ModeChange, Stage};
pub use theme::Theme;
pub use tilt::{TiltEngine, TiltState};
pub use timeline::{TimelineNode, TimelineNodes};
pub use visibility::{ObserverOptions, Rect, VisibilityGate};
