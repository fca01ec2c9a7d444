//! Runtime systems driving the engine each frame.
//!
//! Provides the chained frame stages, keyboard controls, FPS tracking and
//! engine diagnostics.

/// Engine buffer snapshot printed on F1.
pub mod debug_stats;

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to frontend via RPC and updates native UI overlays.
pub mod fps_tracking;

/// Native keyboard shortcuts for starting, locking and resetting the formation.
pub mod formation_controls;

/// Per-frame system ordering, engine start/stop and resize handling.
pub mod frame_driver;
