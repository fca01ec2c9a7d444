use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::render_settings::CONNECTION_LINE_COLOR;

use super::connection_lines::{
    ConnectionLines, connection_line_material, create_connection_line_mesh,
};
use super::flow_ribbons::{FlowRibbon, ribbon_color, spawn_flow_ribbons, write_flow_ribbon};
use super::point_sprite_material::PointSpriteMaterial;
use super::upload::{write_connection_lines, write_point_sprites};
use crate::engine::core::app_state::EngineState;
use crate::engine::core::engine::DreamEngine;
use crate::engine::flow::GLOW_PASSES;
use crate::engine::mesh::point_sprite_mesh::create_point_sprite_mesh;
use crate::engine::systems::frame_driver::{FrameSet, start_engine};

/// Parent of every engine-owned render entity. Despawning it drops the mesh
/// and material handles with it.
#[derive(Component)]
pub struct EngineRenderRoot;

#[derive(Component)]
pub struct ParticleSprites;

#[derive(Component)]
pub struct FormationSprites;

pub struct EngineRenderPlugin;

impl Plugin for EngineRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<PointSpriteMaterial>::default())
            .add_systems(
                OnEnter(EngineState::Running),
                spawn_render_entities.after(start_engine),
            )
            .add_systems(
                Update,
                (
                    upload_particle_sprites,
                    upload_formation_sprites,
                    upload_connection_lines,
                    upload_flow_ribbons,
                )
                    .in_set(FrameSet::Upload),
            )
            .add_systems(OnExit(EngineState::Running), despawn_render_entities);
    }
}

pub fn spawn_render_entities(
    mut commands: Commands,
    engine: Res<DreamEngine>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut sprite_materials: ResMut<Assets<PointSpriteMaterial>>,
    mut standard_materials: ResMut<Assets<StandardMaterial>>,
    mut color_materials: ResMut<Assets<ColorMaterial>>,
) {
    let Some(parts) = engine.parts() else {
        return;
    };
    let sprite_material = sprite_materials.add(PointSpriteMaterial::from_settings(
        &engine.config().render,
    ));

    let root = commands
        .spawn((EngineRenderRoot, Transform::default(), Visibility::default()))
        .id();

    // Sprite quads are expanded in clip space, so mesh bounds mean nothing.
    let mut particle_mesh = create_point_sprite_mesh(parts.particle_buffers.len());
    write_point_sprites(&mut particle_mesh, &parts.particle_buffers);
    let mut formation_mesh = create_point_sprite_mesh(parts.formation.buffers().len());
    write_point_sprites(&mut formation_mesh, parts.formation.buffers());
    let mut line_mesh = create_connection_line_mesh(parts.connections.capacity());
    write_connection_lines(
        &mut line_mesh,
        &parts.connections,
        Vec3::from_array(CONNECTION_LINE_COLOR),
    );

    commands.entity(root).with_children(|parent| {
        parent.spawn((
            Mesh3d(meshes.add(line_mesh)),
            MeshMaterial3d(standard_materials.add(connection_line_material())),
            NoFrustumCulling,
            ConnectionLines,
        ));
        parent.spawn((
            Mesh3d(meshes.add(particle_mesh)),
            MeshMaterial3d(sprite_material.clone()),
            NoFrustumCulling,
            ParticleSprites,
        ));
        parent.spawn((
            Mesh3d(meshes.add(formation_mesh)),
            MeshMaterial3d(sprite_material),
            NoFrustumCulling,
            FormationSprites,
        ));
    });

    spawn_flow_ribbons(
        &mut commands,
        &mut meshes,
        &mut color_materials,
        &parts.flow,
        root,
    );

    info!(
        "Render entities spawned: {} sprites, {} line slots, {} ribbons",
        parts.particle_buffers.len() + parts.formation.buffers().len(),
        parts.connections.capacity(),
        parts.flow.curves().len() * GLOW_PASSES.len()
    );
}

pub fn upload_particle_sprites(
    mut engine: ResMut<DreamEngine>,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<&Mesh3d, With<ParticleSprites>>,
) {
    let Some(parts) = engine.parts_mut() else {
        return;
    };
    if !parts.particle_buffers.take_dirty() {
        return;
    }
    for mesh in &query {
        if let Some(mesh) = meshes.get_mut(&mesh.0) {
            write_point_sprites(mesh, &parts.particle_buffers);
        }
    }
}

pub fn upload_formation_sprites(
    mut engine: ResMut<DreamEngine>,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<&Mesh3d, With<FormationSprites>>,
) {
    let Some(parts) = engine.parts_mut() else {
        return;
    };
    if !parts.formation.buffers_mut().take_dirty() {
        return;
    }
    for mesh in &query {
        if let Some(mesh) = meshes.get_mut(&mesh.0) {
            write_point_sprites(mesh, parts.formation.buffers());
        }
    }
}

pub fn upload_connection_lines(
    mut engine: ResMut<DreamEngine>,
    mut meshes: ResMut<Assets<Mesh>>,
    query: Query<&Mesh3d, With<ConnectionLines>>,
) {
    let Some(parts) = engine.parts_mut() else {
        return;
    };
    if !parts.connections.take_dirty() {
        return;
    }
    let color = Vec3::from_array(CONNECTION_LINE_COLOR);
    for mesh in &query {
        if let Some(mesh) = meshes.get_mut(&mesh.0) {
            write_connection_lines(mesh, &parts.connections, color);
        }
    }
}

pub fn upload_flow_ribbons(
    mut engine: ResMut<DreamEngine>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<(&FlowRibbon, &Mesh2d, &MeshMaterial2d<ColorMaterial>)>,
) {
    let Some(parts) = engine.parts_mut() else {
        return;
    };
    if !parts.flow.take_dirty() {
        return;
    }
    let field = &parts.flow;
    let time_ms = field.time() * 1000.0;

    for (ribbon, mesh, material) in &query {
        let (Some(curve), Some(pass)) = (field.curves().get(ribbon.curve), GLOW_PASSES.get(ribbon.pass))
        else {
            continue;
        };
        if let Some(mesh) = meshes.get_mut(&mesh.0) {
            write_flow_ribbon(mesh, field, ribbon.curve, pass);
        }
        if pass.oscillates {
            if let Some(material) = materials.get_mut(&material.0) {
                material.color = ribbon_color(curve, pass, time_ms);
            }
        }
    }
}

pub fn despawn_render_entities(mut commands: Commands, roots: Query<Entity, With<EngineRenderRoot>>) {
    for root in &roots {
        commands.entity(root).despawn();
    }
}
