/// Ambient background population.
pub const AMBIENT_PARTICLE_COUNT: usize = 400;

/// Dedicated population for the formation ceremony.
pub const FORMATION_PARTICLE_COUNT: usize = 5000;

/// Number of coarse depth buckets used for parallax.
pub const DEPTH_LAYERS: u8 = 3;

/// Speed reduction per depth layer (`1 - layer * factor`).
pub const LAYER_SPEED_FALLOFF: f32 = 0.2;

/// World-space distance between depth layers along -Z.
pub const LAYER_SPACING: f32 = 2.5;

/// Seconds of linear fade-in at the start of a particle's life.
pub const FADE_IN_SECONDS: f32 = 1.0;

/// Seconds of linear fade-out before `max_life`.
pub const FADE_OUT_SECONDS: f32 = 2.0;

/// Distance past the field edge before a particle is recycled.
pub const VIEWPORT_MARGIN: f32 = 2.0;

/// Number of following particles (pool order) checked for connections.
pub const CONNECTION_WINDOW: usize = 12;

/// Pre-allocated connection slots.
pub const MAX_CONNECTIONS: usize = 600;
