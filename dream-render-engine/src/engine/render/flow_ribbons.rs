use bevy::prelude::*;
use bevy::render::mesh::{PrimitiveTopology, VertexAttributeValues};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::view::RenderLayers;
use bevy::sprite::AlphaMode2d;
use constants::render_settings::FLOW_RENDER_LAYER;

use crate::engine::flow::{FlowCurve, FlowField, GLOW_PASSES, StrokePass};
use crate::engine::flow::ribbon::{ribbon_vertex_count, write_ribbon};

/// One stroke pass of one flow curve.
#[derive(Component, Debug, Clone, Copy)]
pub struct FlowRibbon {
    pub curve: usize,
    pub pass: usize,
}

/// Triangle strip sized for a flattened path of `path_len` points.
pub fn create_ribbon_mesh(path_len: usize) -> Mesh {
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleStrip,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        vec![[0.0f32; 3]; ribbon_vertex_count(path_len)],
    );
    mesh
}

/// Stroke colour of `pass` over `curve` at `time_ms`.
pub fn ribbon_color(curve: &FlowCurve, pass: &StrokePass, time_ms: f32) -> Color {
    Color::hsla(
        curve.hue,
        curve.saturation,
        pass.lightness(curve.lightness),
        pass.alpha(time_ms, curve.phase),
    )
}

/// Spawn every curve × pass ribbon on the flow overlay layer. Passes stack
/// back to front: outer glow lowest, core on top.
pub fn spawn_flow_ribbons(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    field: &FlowField,
    root: Entity,
) {
    let path_len = field.path_len();
    let time_ms = field.time() * 1000.0;

    for (curve_index, curve) in field.curves().iter().enumerate() {
        for (pass_index, pass) in GLOW_PASSES.iter().enumerate() {
            let mut mesh = create_ribbon_mesh(path_len);
            write_flow_ribbon(&mut mesh, field, curve_index, pass);
            let z = pass_index as f32 * 0.1 + curve_index as f32 * 0.001;

            commands.entity(root).with_children(|parent| {
                parent.spawn((
                    Mesh2d(meshes.add(mesh)),
                    MeshMaterial2d(materials.add(ColorMaterial {
                        color: ribbon_color(curve, pass, time_ms),
                        alpha_mode: AlphaMode2d::Blend,
                        ..default()
                    })),
                    Transform::from_xyz(0.0, 0.0, z),
                    RenderLayers::layer(FLOW_RENDER_LAYER),
                    FlowRibbon {
                        curve: curve_index,
                        pass: pass_index,
                    },
                ));
            });
        }
    }
}

/// Rewrite the strip of `pass` over curve `curve_index` in place.
pub fn write_flow_ribbon(mesh: &mut Mesh, field: &FlowField, curve_index: usize, pass: &StrokePass) {
    let Some(curve) = field.curves().get(curve_index) else {
        return;
    };
    if let Some(VertexAttributeValues::Float32x3(values)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        let path = field.path(curve_index);
        if values.len() == ribbon_vertex_count(path.len()) {
            write_ribbon(
                path,
                pass.ribbon_width(curve.thickness),
                field.viewport(),
                values,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_pass_is_brighter_and_more_opaque() {
        let curve = FlowCurve {
            hue: 240.0,
            saturation: 0.7,
            lightness: 0.5,
            phase: 0.0,
            speed: 1.0,
            amplitude: 30.0,
            frequency: 1.0,
            thickness: 2.0,
            baseline_offset: 0.0,
            wave_count: 3,
        };
        let outer = ribbon_color(&curve, &GLOW_PASSES[0], 0.0).to_srgba();
        let core = ribbon_color(&curve, &GLOW_PASSES[3], 0.0).to_srgba();
        assert!(core.alpha > outer.alpha);
        let luminance = |c: Srgba| c.red + c.green + c.blue;
        assert!(luminance(core) > luminance(outer));
    }
}
