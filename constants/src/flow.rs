/// Independent flow curves drawn behind the scene.
pub const CURVE_COUNT: usize = 12;

/// Sample segments evaluated per curve per frame.
pub const CURVE_SEGMENTS: usize = 250;

/// Sub-samples used to flatten each Bézier segment for stroking.
pub const BEZIER_SUBDIVISIONS: usize = 3;

/// Spatial frequency multiplier applied to every wave layer.
pub const WAVE_FREQUENCY_SCALE: f32 = 1.3;

/// Exponent of the per-layer amplitude falloff `amp / (w + 1)^k`.
pub const WAVE_AMPLITUDE_FALLOFF: f32 = 0.7;

/// Angular rate of the glow oscillation, per millisecond.
pub const GLOW_RATE_PER_MS: f32 = 0.0004;

/// Peak deviation of the glow oscillation.
pub const GLOW_DEPTH: f32 = 0.12;
