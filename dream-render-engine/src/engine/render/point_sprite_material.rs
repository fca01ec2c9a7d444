use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef};
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError, VertexFormat,
};

use crate::engine::core::config::RenderSettings;

pub const POINT_SPRITE_SHADER: &str = "shaders/point_sprite.wgsl";

/// Per-vertex colour (linear RGB) of the point a corner belongs to.
pub const ATTRIBUTE_POINT_COLOR: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_PointColor", 988_540_916, VertexFormat::Float32x3);

/// Quad corner in `[-0.5, 0.5]²` (xy), point size (z) and opacity (w).
pub const ATTRIBUTE_SPRITE: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_Sprite", 988_540_917, VertexFormat::Float32x4);

/// Soft circular point sprites with perspective size attenuation.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct PointSpriteMaterial {
    /// x: focal constant, y: breathe depth, z: breathe rate, w: unused.
    #[uniform(0)]
    pub params: Vec4,
}

impl PointSpriteMaterial {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            params: Vec4::new(
                settings.focal_constant,
                settings.breathe_depth,
                settings.breathe_rate,
                0.0,
            ),
        }
    }
}

impl Material for PointSpriteMaterial {
    fn vertex_shader() -> ShaderRef {
        POINT_SPRITE_SHADER.into()
    }

    fn fragment_shader() -> ShaderRef {
        POINT_SPRITE_SHADER.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            ATTRIBUTE_POINT_COLOR.at_shader_location(1),
            ATTRIBUTE_SPRITE.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}
