/// Fraction of the remaining distance covered per frame while forming.
pub const CONVERGENCE_RATE: f32 = 0.05;

/// Radial pulsation depth once formed.
pub const PULSE_DEPTH: f32 = 0.05;

/// Per-particle phase step of the radial pulsation.
pub const PULSE_INDEX_PHASE: f32 = 0.01;

/// Shared rotation speed once formed, radians per second.
pub const FORMED_ROTATION_SPEED: f32 = 0.1;

/// Hard ceiling after which the ceremony is forced to lock.
pub const FALLBACK_CEILING_SECONDS: f32 = 6.0;

/// Half extent of the scatter volume.
pub const SCATTER_EXTENT: f32 = 30.0;

/// Radius of the default target sphere.
pub const TARGET_RADIUS: f32 = 6.0;
