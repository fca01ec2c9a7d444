//! Ambient particle lifecycle.
//!
//! A fixed-capacity pool that drifts particles upward through three depth
//! layers, fades them in and out, and recycles slots in place.

/// Particle state and the pure opacity envelope.
pub mod particle;

/// Fixed-capacity pool with emission ramp, update and respawn.
pub mod pool;
