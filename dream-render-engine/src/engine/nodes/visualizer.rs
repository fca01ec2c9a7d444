use std::collections::HashSet;
use std::f32::consts::TAU;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use constants::nodes::{FALLBACK_PLANE_OPACITY, MAIN_GOAL_PLATFORM_BOOST, RISING_HEIGHT};

use super::billboard::{BillboardState, ImageLoad};
use super::events::NodeCompleted;
use super::metrics::{
    billboard_scale, light_intensity, platform_scale, rising_height, rising_opacity, ring_arc,
};
use super::store::NodeStore;
use super::visual_kind::{ResolvedVisual, resolve_visual};
use super::visual_node::VisualNode;
use crate::engine::core::config::{EngineConfig, NodeSettings};
use crate::engine::mesh::progress_ring_mesh::progress_ring_mesh;

/// Height of the billboard centre above the platform.
const BILLBOARD_HEIGHT: f32 = 1.6;
const RISING_BASE_OPACITY: f32 = 0.8;
const GLYPH_FONT_SIZE: f32 = 30.0;

/// Shared meshes for every node.
#[derive(Resource)]
pub struct NodeMeshes {
    platform: Handle<Mesh>,
    plane: Handle<Mesh>,
    sphere: Handle<Mesh>,
    rising: Handle<Mesh>,
}

/// Root entity of one node's visuals.
#[derive(Component, Debug)]
pub struct NodeRoot {
    pub id: String,
    pub visual: ResolvedVisual,
    pub billboard: BillboardState,
    /// Held while loading; dropping it cancels the load.
    image: Option<Handle<Image>>,
    ring_progress: f32,
    color: Color,
}

/// Back-reference from a node part to its root.
#[derive(Component, Debug, Clone, Copy)]
pub struct NodePart {
    pub root: Entity,
}

#[derive(Component)]
pub struct NodePlatform;

#[derive(Component)]
pub struct NodeRing;

#[derive(Component)]
pub struct NodeBillboard;

#[derive(Component)]
pub struct NodeLight;

#[derive(Component)]
pub struct RisingParticle {
    offset: f32,
    angle: f32,
}

/// Screen-space glyph label following a node.
#[derive(Component)]
pub struct NodeGlyph;

/// Store revision last mirrored into entities.
#[derive(Resource, Default)]
pub struct NodeSyncState {
    revision: Option<u64>,
}

pub fn setup_node_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(NodeMeshes {
        platform: meshes.add(Cylinder::new(1.0, 0.08)),
        plane: meshes.add(Rectangle::new(1.0, 1.0)),
        sphere: meshes.add(Sphere::new(0.5).mesh().uv(32, 18)),
        rising: meshes.add(Sphere::new(0.04).mesh().uv(8, 6)),
    });
}

/// Mirror store changes into node entities: spawn new nodes, despawn removed
/// ones, respawn nodes whose resolved visual or colour changed.
#[allow(clippy::too_many_arguments)]
pub fn sync_node_entities(
    mut commands: Commands,
    store: Res<NodeStore>,
    config: Res<EngineConfig>,
    node_meshes: Res<NodeMeshes>,
    asset_server: Res<AssetServer>,
    mut sync: ResMut<NodeSyncState>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut roots: Query<(Entity, &NodeRoot, &mut Transform)>,
    glyphs: Query<(Entity, &NodePart), With<NodeGlyph>>,
) {
    if sync.revision == Some(store.revision()) {
        return;
    }
    sync.revision = Some(store.revision());

    let mut kept: HashSet<&str> = HashSet::new();
    for (entity, root, mut transform) in &mut roots {
        let current = store
            .get(&root.id)
            .filter(|node| resolve_visual(node) == root.visual && node_color(node) == root.color);
        match current {
            Some(node) => {
                transform.translation = node.translation();
                kept.insert(node.id.as_str());
            }
            None => despawn_node(&mut commands, entity, &glyphs),
        }
    }

    for node in store.iter() {
        if !kept.contains(node.id.as_str()) {
            spawn_node(
                &mut commands,
                node,
                &config.nodes,
                &node_meshes,
                &asset_server,
                &mut materials,
            );
        }
    }
}

fn despawn_node(
    commands: &mut Commands,
    root: Entity,
    glyphs: &Query<(Entity, &NodePart), With<NodeGlyph>>,
) {
    for (glyph, part) in glyphs {
        if part.root == root {
            commands.entity(glyph).despawn();
        }
    }
    commands.entity(root).despawn();
}

fn node_color(node: &VisualNode) -> Color {
    let rgb = node.linear_rgb();
    Color::linear_rgb(rgb.x, rgb.y, rgb.z)
}

fn new_root(node: &VisualNode, asset_server: &AssetServer) -> NodeRoot {
    let visual = resolve_visual(node);
    let image = match &visual {
        ResolvedVisual::Image(url) => Some(asset_server.load::<Image>(url.clone())),
        _ => None,
    };
    NodeRoot {
        billboard: BillboardState::initial(&visual),
        id: node.id.clone(),
        visual,
        image,
        ring_progress: f32::NAN,
        color: node_color(node),
    }
}

fn glow_material(color: Color, alpha: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_alpha(alpha),
        emissive: color.to_linear() * 2.0,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        cull_mode: None,
        ..default()
    }
}

fn spawn_node(
    commands: &mut Commands,
    node: &VisualNode,
    settings: &NodeSettings,
    node_meshes: &NodeMeshes,
    asset_server: &AssetServer,
    materials: &mut Assets<StandardMaterial>,
) {
    let root = new_root(node, asset_server);
    let color = root.color;
    let entity = commands
        .spawn((
            Transform::from_translation(node.translation()),
            Visibility::default(),
        ))
        .id();

    commands.entity(entity).with_children(|parent| {
        let part = NodePart { root: entity };
        parent.spawn((
            NodePlatform,
            part,
            Mesh3d(node_meshes.platform.clone()),
            MeshMaterial3d(materials.add(glow_material(color, 0.35))),
            Transform::default(),
        ));
        parent.spawn((
            NodeRing,
            part,
            Mesh3d(Handle::<Mesh>::default()),
            MeshMaterial3d(materials.add(glow_material(color, 0.9))),
            Transform::from_xyz(0.0, 0.05, 0.0),
            NoFrustumCulling,
        ));
        parent.spawn((
            NodeLight,
            part,
            PointLight {
                color,
                intensity: settings.light_intensity,
                range: settings.light_range,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_xyz(0.0, 0.6, 0.0),
        ));
        for index in 0..settings.rising_particles {
            let fraction = index as f32 / settings.rising_particles.max(1) as f32;
            parent.spawn((
                RisingParticle {
                    offset: fraction * RISING_HEIGHT,
                    angle: fraction * TAU,
                },
                part,
                Mesh3d(node_meshes.rising.clone()),
                MeshMaterial3d(materials.add(glow_material(color, RISING_BASE_OPACITY))),
                Transform::default(),
            ));
        }
    });

    spawn_billboard(commands, entity, &root, node_meshes, materials);
    spawn_glyph(commands, entity, &root);
    commands.entity(entity).insert(root);
}

fn spawn_billboard(
    commands: &mut Commands,
    entity: Entity,
    root: &NodeRoot,
    node_meshes: &NodeMeshes,
    materials: &mut Assets<StandardMaterial>,
) {
    let (mesh, material, visibility) = match &root.billboard {
        BillboardState::Sphere => (
            node_meshes.sphere.clone(),
            StandardMaterial {
                base_color: root.color,
                emissive: root.color.to_linear() * 0.6,
                ..default()
            },
            Visibility::Inherited,
        ),
        BillboardState::Glyph(_) => (
            node_meshes.plane.clone(),
            glow_material(root.color, 0.0),
            Visibility::Hidden,
        ),
        _ => (
            node_meshes.plane.clone(),
            glow_material(root.color, FALLBACK_PLANE_OPACITY),
            Visibility::Inherited,
        ),
    };
    let billboard = commands
        .spawn((
            NodeBillboard,
            NodePart { root: entity },
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(material)),
            Transform::from_xyz(0.0, BILLBOARD_HEIGHT, 0.0),
            visibility,
        ))
        .id();
    commands.entity(entity).add_child(billboard);
}

fn spawn_glyph(commands: &mut Commands, entity: Entity, root: &NodeRoot) {
    let BillboardState::Glyph(glyph) = &root.billboard else {
        return;
    };
    commands.spawn((
        NodeGlyph,
        NodePart { root: entity },
        Text::new(glyph.clone()),
        TextFont {
            font_size: GLYPH_FONT_SIZE,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            ..default()
        },
        Visibility::Hidden,
    ));
}

/// Poll pending image loads and swap in the texture or the fallback plane.
pub fn poll_billboard_images(
    asset_server: Res<AssetServer>,
    mut roots: Query<(Entity, &mut NodeRoot)>,
    billboards: Query<(&NodePart, &MeshMaterial3d<StandardMaterial>), With<NodeBillboard>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, mut root) in &mut roots {
        if !root.billboard.awaits_image() {
            continue;
        }
        let Some(handle) = root.image.clone() else {
            root.billboard.observe(ImageLoad::Failed);
            continue;
        };
        let load = match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => ImageLoad::Loaded,
            Some(LoadState::Failed(error)) => {
                warn!("Image for node {} failed to load: {}", root.id, error);
                ImageLoad::Failed
            }
            _ => ImageLoad::Pending,
        };
        if !root.billboard.observe(load) {
            continue;
        }

        let Some(material_handle) = billboards
            .iter()
            .find(|(part, _)| part.root == entity)
            .map(|(_, material)| material.0.clone())
        else {
            continue;
        };
        let Some(material) = materials.get_mut(&material_handle) else {
            continue;
        };
        if root.billboard == BillboardState::Image {
            material.base_color = Color::WHITE;
            material.base_color_texture = Some(handle);
            material.emissive = LinearRgba::BLACK;
        } else {
            material.base_color = root.color.with_alpha(FALLBACK_PLANE_OPACITY);
            root.image = None;
        }
    }
}

/// Re-derive every progress-driven quantity for the frame.
#[allow(clippy::too_many_arguments)]
pub fn animate_nodes(
    time: Res<Time>,
    store: Res<NodeStore>,
    config: Res<EngineConfig>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut roots: Query<(&mut NodeRoot, &GlobalTransform)>,
    mut platforms: Query<(&NodePart, &mut Transform), With<NodePlatform>>,
    mut rings: Query<(&NodePart, &mut Mesh3d), With<NodeRing>>,
    mut billboards: Query<
        (&NodePart, &mut Transform),
        (With<NodeBillboard>, Without<NodePlatform>, Without<RisingParticle>),
    >,
    mut lights: Query<(&NodePart, &mut PointLight)>,
    mut rising: Query<
        (&NodePart, &RisingParticle, &mut Transform, &MeshMaterial3d<StandardMaterial>),
        (Without<NodePlatform>, Without<NodeBillboard>),
    >,
    mut glyphs: Query<(&NodePart, &mut Node, &mut TextFont, &mut Visibility), With<NodeGlyph>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let settings = &config.nodes;
    let elapsed = time.elapsed_secs();
    let camera = cameras.single().ok();
    let facing = camera
        .map(|(_, xf)| xf.compute_transform().rotation)
        .unwrap_or(Quat::IDENTITY);

    for (part, mut transform) in &mut platforms {
        if let Some(node) = node_for(&store, &roots, part.root) {
            let boost = if node.is_main_goal { MAIN_GOAL_PLATFORM_BOOST } else { 1.0 };
            let radius = platform_scale(node.progress) * settings.platform_radius * boost;
            transform.scale = Vec3::new(radius, 1.0, radius);
        }
    }

    for (part, mut mesh) in &mut rings {
        let Ok((mut root, _)) = roots.get_mut(part.root) else {
            continue;
        };
        let Some(node) = store.get(&root.id) else {
            continue;
        };
        if root.ring_progress == node.progress {
            continue;
        }
        root.ring_progress = node.progress;
        let boost = if node.is_main_goal { MAIN_GOAL_PLATFORM_BOOST } else { 1.0 };
        let outer = settings.platform_radius * 1.3 * boost;
        let ring = progress_ring_mesh(ring_arc(node.progress), outer * 0.92, outer);
        match meshes.get_mut(&mesh.0) {
            Some(existing) => *existing = ring,
            None => mesh.0 = meshes.add(ring),
        }
    }

    for (part, mut transform) in &mut billboards {
        if let Some(node) = node_for(&store, &roots, part.root) {
            let scale = billboard_scale(node.progress, node.is_focused()) * settings.billboard_size;
            transform.rotation = facing;
            transform.scale = Vec3::splat(scale);
        }
    }

    for (part, mut light) in &mut lights {
        if let Some(node) = node_for(&store, &roots, part.root) {
            light.intensity = light_intensity(settings.light_intensity, node.progress);
        }
    }

    for (part, particle, mut transform, material) in &mut rising {
        let Some(node) = node_for(&store, &roots, part.root) else {
            continue;
        };
        let radius = platform_scale(node.progress) * settings.platform_radius * 0.8;
        let height = rising_height(elapsed, settings.rising_speed, particle.offset);
        let angle = particle.angle + elapsed * 0.3;
        transform.translation = Vec3::new(angle.cos() * radius, height, angle.sin() * radius);
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color.set_alpha(rising_opacity(RISING_BASE_OPACITY, height));
        }
    }

    for (part, mut ui_node, mut font, mut visibility) in &mut glyphs {
        let placed = camera.and_then(|(camera, cam_xf)| {
            let (root, root_xf) = roots.get(part.root).ok()?;
            let node = store.get(&root.id)?;
            let anchor = root_xf.translation() + Vec3::Y * BILLBOARD_HEIGHT;
            let screen = camera.world_to_viewport(cam_xf, anchor).ok()?;
            Some((screen, billboard_scale(node.progress, node.is_focused())))
        });
        match placed {
            Some((screen, scale)) => {
                font.font_size = GLYPH_FONT_SIZE * scale;
                ui_node.left = Val::Px(screen.x - font.font_size * 0.5);
                ui_node.top = Val::Px(screen.y - font.font_size * 0.5);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

fn node_for<'a>(
    store: &'a NodeStore,
    roots: &Query<(&mut NodeRoot, &GlobalTransform)>,
    entity: Entity,
) -> Option<&'a VisualNode> {
    let (root, _) = roots.get(entity).ok()?;
    store.get(&root.id)
}

/// Forward one-shot completion signals from the store.
pub fn emit_completed_nodes(mut store: ResMut<NodeStore>, mut events: EventWriter<NodeCompleted>) {
    for id in store.drain_completed() {
        info!("Node {} reached full progress", id);
        events.write(NodeCompleted(id));
    }
}

/// Despawn every node entity and forget the mirrored revision.
pub fn despawn_node_entities(
    mut commands: Commands,
    roots: Query<Entity, With<NodeRoot>>,
    glyphs: Query<Entity, With<NodeGlyph>>,
    mut sync: ResMut<NodeSyncState>,
) {
    for entity in roots.iter().chain(glyphs.iter()) {
        commands.entity(entity).despawn();
    }
    sync.revision = None;
}
