/// Projection constant used for perspective point-size attenuation.
pub const POINT_FOCAL_CONSTANT: f32 = 300.0;

/// Amplitude of the global point "breathing" pulse.
pub const BREATHE_DEPTH: f32 = 0.02;

/// Angular rate of the breathing pulse, radians per second.
pub const BREATHE_RATE: f32 = 0.5;

/// Radius beyond which sprite fragments are discarded.
pub const SPRITE_RADIUS: f32 = 0.5;

/// Start of the anti-aliased edge falloff.
pub const SPRITE_EDGE_START: f32 = 0.2;

/// Exponential glow falloff coefficient.
pub const SPRITE_GLOW_FALLOFF: f32 = 3.0;

/// Render layer used by the 2D flow overlay camera.
pub const FLOW_RENDER_LAYER: usize = 1;

/// Linear RGB of constellation lines; alpha comes from the distance falloff.
pub const CONNECTION_LINE_COLOR: [f32; 3] = [0.55, 0.65, 1.0];

/// Draw order of the flow overlay camera; the 3D camera draws after it.
pub const FLOW_CAMERA_ORDER: isize = 0;
