//! Rendering of engine buffers.
//!
//! Particles and the formation set draw as soft point sprites through a
//! custom material, constellation lines as a blended line list, and flow
//! curves as layered 2D ribbons behind the 3D scene. Every mesh is allocated
//! at start and rewritten in place when its source buffer is dirty.

/// Constellation line mesh and its unlit blended material.
pub mod connection_lines;

/// Flow curve ribbons: one triangle strip per curve and stroke pass.
pub mod flow_ribbons;

/// Structure-of-arrays point buffers with an explicit dirty flag.
pub mod point_buffers;

/// Point-sprite material with a custom vertex layout.
///
/// Quads are pushed out in clip space by the vertex shader; see
/// `assets/shaders/point_sprite.wgsl`.
pub mod point_sprite_material;

/// Spawning, per-frame upload and teardown of render entities.
pub mod render_plugin;

pub mod sprite;

/// In-place copies from engine buffers into mesh attributes.
pub mod upload;

pub use render_plugin::EngineRenderPlugin;
