//! Tuning constants shared between the simulation core and the render layer.

pub mod flow;
pub mod formation;
pub mod nodes;
pub mod particles;
pub mod render_settings;
