// Shared tuning constants for the effect simulators and capability policy.

// Capability classification
pub const COMPACT_VIEWPORT_MAX_PX: f64 = 768.0; // widths at or below are "compact"
pub const HIGH_TIER_MIN_PROCESSORS: u32 = 8;
pub const HIGH_TIER_MAX_PIXEL_RATIO: f64 = 2.0;
pub const SOFTWARE_RENDERER_MARKERS: [&str; 2] = ["software", "llvmpipe"];

// Particle-count policy
pub const PARTICLES_COMPACT: usize = 15;
pub const PARTICLES_HIGH_TIER: usize = 40;
pub const PARTICLES_LOW_TIER: usize = 25;
pub const FALLBACK_MARKERS_MAX: usize = 20;

// Visibility gate
pub const VISIBILITY_THRESHOLD: f64 = 0.1; // fraction of the region that must overlap
pub const VISIBILITY_ROOT_MARGIN_PX: f64 = 50.0;

// Particle field (scene units, per-frame velocities)
pub const FIELD_HALF_EXTENTS: [f32; 3] = [6.0, 5.0, 3.0];
pub const INITIAL_SPEED_MAX: f32 = 0.01;
pub const DRIFT_COUPLING: f32 = 0.001;
pub const BOUNCE_DAMPING: f32 = -0.8;
pub const JITTER_PROBABILITY: f64 = 0.001;
pub const JITTER_HALF_RANGE: f32 = 0.0005;
pub const FIELD_SWAY_RATE: f32 = 0.1;
pub const FIELD_SWAY_AMPLITUDE: f32 = 0.1; // radians
pub const FIELD_SPIN_RATE: f32 = 0.05; // radians per second

// Static particle markers
pub const MARKER_RADIUS_MIN_PX: f32 = 2.0;
pub const MARKER_RADIUS_SPAN_PX: f32 = 4.0;
pub const MARKER_OPACITY_MIN: f32 = 0.4;
pub const MARKER_OPACITY_SPAN: f32 = 0.4;
pub const MARKER_DELAY_MAX_SEC: f32 = 6.0;
pub const MARKER_BASE_DURATION_SEC: f32 = 6.0;

// Orbital layout
pub const ORBIT_MAX_NODES: usize = 8;
pub const ORBIT_PER_CATEGORY: usize = 2;
pub const ORBIT_RADIUS: f32 = 3.0;
pub const ORBIT_BASE_SPEED: f32 = 0.3;
pub const ORBIT_SPEED_STEP: f32 = 0.1;
pub const ORBIT_BOB_AMPLITUDE: f32 = 0.2;
pub const ORBIT_NODE_RADIUS: f32 = 0.8; // badge sphere radius, also the pick radius
pub const HIGHLIGHT_SCALE: f32 = 1.3;
pub const SCALE_SMOOTHING: f32 = 0.1; // fraction of the remaining gap closed per frame
pub const HUB_PULSE_RATE: f32 = 2.0;
pub const HUB_PULSE_AMPLITUDE: f32 = 0.1;
pub const HUB_SPIN_RATE: f32 = 0.2;
pub const SCENE_SPIN_RATE: f32 = 0.05;
pub const HUB_SPOKES: usize = 8;
pub const HUB_SPOKE_LENGTH: f32 = 2.0;

// Pointer tilt
pub const TILT_DEFAULT_INTENSITY_DEG: f32 = 15.0;
pub const TILT_SHADOW_MAGNITUDE_PX: f32 = 20.0;
pub const TILT_PERSPECTIVE_PX: f32 = 1200.0;
pub const TILT_LIFT_PX: f32 = 20.0;
pub const TILT_GLARE_BASE_DEG: f32 = 135.0;

// Timeline nodes
pub const TIMELINE_SPACING: f32 = 1.5;
pub const TIMELINE_BOB_AMPLITUDE: f32 = 0.1;
pub const TIMELINE_IDLE_GLOW: f32 = 0.2;
pub const TIMELINE_GLOW_RATE: f32 = 3.0;
pub const TIMELINE_GLOW_BASE: f32 = 0.7;
pub const TIMELINE_GLOW_SPAN: f32 = 0.3;
pub const TIMELINE_PULSE_RATE: f32 = 2.0;
pub const TIMELINE_PULSE_AMPLITUDE: f32 = 0.1;
pub const TIMELINE_SWAY_RATE: f32 = 0.5;
pub const TIMELINE_SWAY_AMPLITUDE: f32 = 0.05;
pub const TIMELINE_PX_PER_ITEM: f32 = 100.0;
pub const TIMELINE_MIN_HEIGHT_PX: f32 = 300.0;
pub const TIMELINE_FALLBACK_SPACING_PX: f32 = 60.0;

// Parallax
pub const PARALLAX_MAX_OFFSET_PX: f32 = 20.0;
pub const PARALLAX_DEFAULT_STRENGTH: f32 = 0.5;

// Cross-highlight
pub const CHIP_DIMMED_OPACITY: f32 = 0.6;

// Scene cameras (eye position, vertical fov in degrees)
pub const PARTICLE_CAMERA_EYE: [f32; 3] = [0.0, 0.0, 5.0];
pub const PARTICLE_CAMERA_FOV_DEG: f32 = 75.0;
pub const ORBIT_CAMERA_EYE: [f32; 3] = [0.0, 0.0, 8.0];
pub const ORBIT_CAMERA_FOV_DEG: f32 = 50.0;
pub const TIMELINE_CAMERA_EYE: [f32; 3] = [2.0, 0.0, 3.0];
pub const TIMELINE_CAMERA_FOV_DEG: f32 = 50.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
