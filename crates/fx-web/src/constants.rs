// Drawing and DOM constants for the browser host

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// Upper bound on the canvas backing-store pixel ratio
pub const MAX_CANVAS_DPR: f64 = 1.5;

// Particle sprites (world units / alpha)
pub const PARTICLE_POINT_SIZE: f32 = 0.08;
pub const PARTICLE_ALPHA: f64 = 0.7;

// Constellation hub and badges (world units)
pub const HUB_OUTER_RADIUS: f32 = 0.5;
pub const HUB_CORE_RADIUS: f32 = 0.3;
pub const HUB_OUTER_ALPHA: f64 = 0.6;
pub const HUB_CORE_ALPHA: f64 = 0.8;
pub const HUB_SPOKE_ALPHA: f64 = 0.3;
pub const BADGE_GLOW_RADIUS: f32 = 1.1;
pub const BADGE_ALPHA: f64 = 0.8;
pub const BADGE_GLOW_ALPHA_ACTIVE: f64 = 0.2;
pub const BADGE_GLOW_ALPHA_IDLE: f64 = 0.05;
pub const BADGE_LABEL_SIZE: f32 = 0.3;

// Timeline markers (world units)
pub const TIMELINE_NODE_RADIUS: f32 = 0.15;
pub const TIMELINE_HALO_RADIUS: f32 = 0.25;
pub const TIMELINE_HALO_ALPHA_ACTIVE: f64 = 0.2;
pub const TIMELINE_HALO_ALPHA_IDLE: f64 = 0.1;
pub const TIMELINE_NODE_ALPHA: f64 = 0.8;
pub const TIMELINE_CANVAS_WIDTH_PX: f64 = 100.0;

// Static fallbacks
pub const FALLBACK_LAYER_CLASS: &str = "fx-fallback";
pub const FALLBACK_MARKER_CLASS: &str = "fx-fallback-marker";
pub const TIMELINE_FALLBACK_CLASS: &str = "timeline-node-fallback";
pub const TIMELINE_FALLBACK_SIZE_PX: f64 = 24.0;
pub const ORBIT_FALLBACK_CLASS: &str = "fx-orbit-static";
// Ring radius of the static constellation, as a fraction of the container
pub const ORBIT_FALLBACK_RING_PCT: f32 = 38.0;

// Chip attribute carrying the skill label; falls back to text content
pub const CHIP_LABEL_ATTR: &str = "data-skill";
pub const CHIP_OPACITY_TRANSITION: &str = "opacity 0.3s ease";

// Tilt transitions
pub const TILT_RETURN_TRANSITION: &str = "transform 0.4s cubic-bezier(0.23, 1, 0.320, 1)";
pub const TILT_SHADOW_TRANSITION: &str = "box-shadow 0.4s cubic-bezier(0.23, 1, 0.320, 1)";
pub const TILT_GLARE_CLASS: &str = "fx-tilt-glare";
