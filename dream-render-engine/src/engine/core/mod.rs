//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, configuration
//! loading and the simulation core that every plugin reads from.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the point-sprite material, flow overlay,
/// node visualizer, camera rig and bridge plugins.
pub mod app_setup;

/// Engine lifecycle states and the loading → running transition.
pub mod app_state;

/// Serde-backed engine configuration with validation.
pub mod config;

/// The simulation core: owns every per-frame buffer.
pub mod engine;

pub mod error;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
