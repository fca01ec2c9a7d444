//! Asset loading and engine initialisation.
//!
//! Resolves the JSON engine configuration (falling back to defaults), builds
//! the engine resource and seeds the node store before the state machine
//! enters `Running`.

/// Engine configuration loading and engine resource construction.
///
/// A missing or invalid configuration never blocks startup.
pub mod config_loader;

/// Optional node list shipped with the app for standalone runs.
pub mod node_seed;

/// Loading progress tracking resource for state transitions.
pub mod progress;
