//! Procedural particle and flow visualization engine.
//!
//! The simulation core (particle pool, connection graph, flow field,
//! formation controller, node metrics, camera rig) is plain Rust and runs
//! headless; Bevy plugins wrap it for rendering and the host-page bridge.

pub mod engine;
pub mod rpc;

pub use engine::core::app_setup::create_app;
pub use engine::core::config::EngineConfig;
pub use engine::core::engine::DreamEngine;
