//! Procedural background flow curves.
//!
//! Each curve is a layered waveform sampled across the viewport, smoothed
//! through Catmull-Rom derived Bézier segments and stroked as four glow
//! passes. Sample positions are in viewport pixels, origin top-left, +Y down.

pub mod curve;
pub mod field;
pub mod glow;
pub mod ribbon;
pub mod spline;

pub use curve::FlowCurve;
pub use field::FlowField;
pub use glow::{GLOW_PASSES, StrokePass, glow_factor};
