use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;

use crate::engine::render::point_sprite_material::{ATTRIBUTE_POINT_COLOR, ATTRIBUTE_SPRITE};

/// Vertices emitted per point: two triangles forming a quad.
pub const VERTICES_PER_POINT: usize = 6;

/// Quad corners in vertex order, matching two counter-clockwise triangles.
pub const QUAD_CORNERS: [[f32; 2]; VERTICES_PER_POINT] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
];

/// Allocate a sprite mesh for `point_count` points. Every vertex starts at
/// the origin with zero size and opacity; the upload step rewrites values in
/// place, so the buffer layout never changes after this call.
pub fn create_point_sprite_mesh(point_count: usize) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );

    let vertex_count = point_count * VERTICES_PER_POINT;
    let sprites: Vec<[f32; 4]> = (0..vertex_count)
        .map(|i| {
            let [x, y] = QUAD_CORNERS[i % VERTICES_PER_POINT];
            [x, y, 0.0, 0.0]
        })
        .collect();

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0f32; 3]; vertex_count]);
    mesh.insert_attribute(ATTRIBUTE_POINT_COLOR, vec![[1.0f32; 3]; vertex_count]);
    mesh.insert_attribute(ATTRIBUTE_SPRITE, sprites);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn six_vertices_per_point() {
        let mesh = create_point_sprite_mesh(10);
        assert_eq!(mesh.count_vertices(), 60);

        let Some(VertexAttributeValues::Float32x4(sprites)) = mesh.attribute(ATTRIBUTE_SPRITE)
        else {
            panic!("sprite attribute missing");
        };
        assert_eq!(sprites[7], [0.5, -0.5, 0.0, 0.0]);
        assert!(sprites.iter().all(|s| s[3] == 0.0));
    }
}
