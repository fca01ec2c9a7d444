use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;

use crate::engine::connections::ConnectionBuffer;
use crate::engine::mesh::point_sprite_mesh::VERTICES_PER_POINT;
use crate::engine::render::point_buffers::PointBuffers;
use crate::engine::render::point_sprite_material::{ATTRIBUTE_POINT_COLOR, ATTRIBUTE_SPRITE};

/// Copy point buffers into a sprite mesh built by
/// [`create_point_sprite_mesh`](crate::engine::mesh::point_sprite_mesh::create_point_sprite_mesh).
///
/// Values are rewritten in place. Points past the mesh capacity are ignored.
pub fn write_point_sprites(mesh: &mut Mesh, buffers: &PointBuffers) {
    let positions: &[[f32; 3]] = bytemuck::cast_slice(buffers.positions());
    let colors: &[[f32; 3]] = bytemuck::cast_slice(buffers.colors());

    if let Some(VertexAttributeValues::Float32x3(values)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        for (quad, position) in values.chunks_exact_mut(VERTICES_PER_POINT).zip(positions) {
            quad.fill(*position);
        }
    }

    if let Some(VertexAttributeValues::Float32x3(values)) = mesh.attribute_mut(ATTRIBUTE_POINT_COLOR)
    {
        for (quad, color) in values.chunks_exact_mut(VERTICES_PER_POINT).zip(colors) {
            quad.fill(*color);
        }
    }

    if let Some(VertexAttributeValues::Float32x4(values)) = mesh.attribute_mut(ATTRIBUTE_SPRITE) {
        let params = buffers.sizes().iter().zip(buffers.opacities());
        for (quad, (size, opacity)) in values.chunks_exact_mut(VERTICES_PER_POINT).zip(params) {
            for corner in quad {
                corner[2] = *size;
                corner[3] = *opacity;
            }
        }
    }
}

/// Copy every connection slot into a `LineList` mesh, two vertices per slot.
/// Slots past the active range carry zero alpha.
pub fn write_connection_lines(mesh: &mut Mesh, connections: &ConnectionBuffer, color: Vec3) {
    if let Some(VertexAttributeValues::Float32x3(values)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        for (line, connection) in values.chunks_exact_mut(2).zip(connections.slots()) {
            line[0] = connection.start.to_array();
            line[1] = connection.end.to_array();
        }
    }

    if let Some(VertexAttributeValues::Float32x4(values)) = mesh.attribute_mut(Mesh::ATTRIBUTE_COLOR)
    {
        for (line, alpha) in values.chunks_exact_mut(2).zip(connections.alphas()) {
            line.fill([color.x, color.y, color.z, *alpha]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::connections::ConnectionGraphBuilder;
    use crate::engine::core::config::ConnectionSettings;
    use crate::engine::mesh::point_sprite_mesh::create_point_sprite_mesh;
    use crate::engine::render::connection_lines::create_connection_line_mesh;

    #[test]
    fn point_values_land_on_all_six_corners() {
        let mut buffers = PointBuffers::with_capacity(2);
        buffers.write(1, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 0.6, 0.7), 4.0, 0.9);
        let mut mesh = create_point_sprite_mesh(2);
        write_point_sprites(&mut mesh, &buffers);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        assert!(positions[6..12].iter().all(|p| *p == [1.0, 2.0, 3.0]));
        assert_eq!(positions[0], [0.0, 0.0, 0.0]);

        let Some(VertexAttributeValues::Float32x4(sprites)) = mesh.attribute(ATTRIBUTE_SPRITE)
        else {
            panic!("sprites missing");
        };
        assert_eq!(sprites[8], [0.5, 0.5, 4.0, 0.9]);
        assert_eq!(sprites[2][3], 0.0);
    }

    #[test]
    fn stale_connection_slots_are_transparent() {
        let settings = ConnectionSettings {
            distance_threshold: 10.0,
            window: 4,
            max_connections: 3,
            line_opacity: 0.5,
        };
        let builder = ConnectionGraphBuilder::new(&settings);
        let mut buffer = ConnectionBuffer::with_capacity(settings.max_connections);
        let positions = [Vec3::ZERO, Vec3::X, Vec3::splat(100.0)];
        builder.rebuild(&positions, positions.len(), &mut buffer);
        assert_eq!(buffer.active_count(), 1);

        let mut mesh = create_connection_line_mesh(settings.max_connections);
        write_connection_lines(&mut mesh, &buffer, Vec3::ONE);

        let Some(VertexAttributeValues::Float32x4(colors)) = mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("colors missing");
        };
        assert!(colors[0][3] > 0.0);
        assert!(colors[2..].iter().all(|c| c[3] == 0.0));
    }
}
