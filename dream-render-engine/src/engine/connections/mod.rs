//! Constellation lines between nearby ambient particles.
//!
//! Connections are rebuilt every frame from pool positions into a buffer
//! allocated once at start; nothing here survives past the frame.

pub mod graph_builder;

pub use graph_builder::{Connection, ConnectionBuffer, ConnectionGraphBuilder};
