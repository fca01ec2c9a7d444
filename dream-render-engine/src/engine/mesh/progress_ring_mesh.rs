use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

/// Segments used for a full ring; partial arcs use a proportional share.
const RING_SEGMENTS: usize = 96;

/// Flat annulus sector in the XZ plane, starting at 12 o'clock and sweeping
/// clockwise seen from above. An empty arc yields an empty mesh.
pub fn progress_ring_mesh(arc: f32, inner: f32, outer: f32) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );

    let arc = if arc.is_finite() { arc.clamp(0.0, std::f32::consts::TAU) } else { 0.0 };
    let segments = ((arc / std::f32::consts::TAU) * RING_SEGMENTS as f32).ceil() as usize;

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity((segments + 1) * 2);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity((segments + 1) * 2);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity((segments + 1) * 2);
    let mut indices: Vec<u32> = Vec::with_capacity(segments * 6);

    if segments > 0 {
        for step in 0..=segments {
            let fraction = step as f32 / segments as f32;
            let angle = FRAC_PI_2 - arc * fraction;
            let (sin, cos) = angle.sin_cos();
            positions.push([cos * inner, 0.0, -sin * inner]);
            positions.push([cos * outer, 0.0, -sin * outer]);
            normals.extend([[0.0, 1.0, 0.0]; 2]);
            uvs.push([fraction, 0.0]);
            uvs.push([fraction, 1.0]);
        }
        for step in 0..segments as u32 {
            let i = step * 2;
            indices.extend([i, i + 1, i + 2, i + 1, i + 3, i + 2]);
        }
    }

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
