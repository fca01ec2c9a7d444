//! Mesh generation for engine render primitives.
//!
//! Every mesh here is allocated once at full capacity; per-frame updates only
//! rewrite attribute values in place.

/// Point-sprite quads: six vertices per point, expanded in the vertex shader.
pub mod point_sprite_mesh;

/// Flat annulus sector used for node progress rings.
pub mod progress_ring_mesh;
