use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;

/// Marker for the single constellation line mesh.
#[derive(Component)]
pub struct ConnectionLines;

/// Line list with two vertices per connection slot. Vertex colour carries
/// the per-line alpha, so the material stays a plain unlit blend.
pub fn create_connection_line_mesh(capacity: usize) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::LineList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    let vertex_count = capacity * 2;
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0f32; 3]; vertex_count]);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, vec![[0.0f32; 4]; vertex_count]);
    mesh
}

pub fn connection_line_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}
