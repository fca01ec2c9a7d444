/// Platform scale at zero progress.
pub const PLATFORM_BASE_SCALE: f32 = 0.8;

/// Additional platform scale gained at full progress.
pub const PLATFORM_PROGRESS_SCALE: f32 = 0.5;

/// Multiplier applied to the billboard while hovered or selected.
pub const FOCUS_SCALE: f32 = 1.2;

/// Height at which rising particles wrap back to the platform.
pub const RISING_HEIGHT: f32 = 3.0;

/// Rising particles per node.
pub const RISING_PARTICLES_PER_NODE: usize = 8;

/// Platform radius multiplier for the main goal.
pub const MAIN_GOAL_PLATFORM_BOOST: f32 = 1.35;

/// Opacity of the flat plane shown when an image fails to load.
pub const FALLBACK_PLANE_OPACITY: f32 = 0.45;

/// Longest string still treated as a glyph rather than an image path.
pub const GLYPH_MAX_CHARS: usize = 4;
