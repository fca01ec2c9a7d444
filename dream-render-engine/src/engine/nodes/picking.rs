use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::events::{NodeHoverEvent, NodeSelectEvent};
use super::metrics::platform_scale;
use super::store::NodeStore;
use crate::engine::core::config::EngineConfig;

/// Nearest non-negative ray parameter hitting a sphere.
pub fn ray_sphere_hit(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let direction = direction.try_normalize()?;
    let offset = origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    let far = -b + root;
    if far < 0.0 {
        None
    } else if near >= 0.0 {
        Some(near)
    } else {
        Some(far)
    }
}

/// Closest node hit by the ray, picking radius scaled with progress.
pub fn pick_node<'a>(
    store: &'a NodeStore,
    origin: Vec3,
    direction: Vec3,
    pick_radius: f32,
) -> Option<&'a str> {
    store
        .iter()
        .filter_map(|node| {
            let radius = pick_radius * platform_scale(node.progress);
            ray_sphere_hit(origin, direction, node.translation(), radius).map(|t| (node, t))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(node, _)| node.id.as_str())
}

/// Tracks the last hover so events fire on change only.
#[derive(Resource, Default, Debug)]
pub struct HoverState {
    pub current: Option<String>,
}

/// Cursor hover and left-click selection against node bounds.
pub fn pick_nodes(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    config: Res<EngineConfig>,
    mut store: ResMut<NodeStore>,
    mut hover: ResMut<HoverState>,
    mut hover_events: EventWriter<NodeHoverEvent>,
    mut select_events: EventWriter<NodeSelectEvent>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((cam_xf, camera)) = cameras.single() else {
        return;
    };

    let hit = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world(cam_xf, cursor).ok())
        .and_then(|ray| {
            pick_node(&store, ray.origin, ray.direction.as_vec3(), config.nodes.pick_radius)
        })
        .map(str::to_owned);

    if hit != hover.current {
        hover.current = hit.clone();
        if config.nodes.local_echo {
            store.set_hovered(hit.as_deref());
        }
        hover_events.write(NodeHoverEvent(hit.clone()));
    }

    if buttons.just_pressed(MouseButton::Left) {
        if let Some(id) = hit {
            if config.nodes.local_echo {
                store.set_selected(Some(&id));
            }
            select_events.write(NodeSelectEvent(id));
        }
    }
}

/// Escape clears a locally echoed selection.
pub fn deselect_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Res<EngineConfig>,
    mut store: ResMut<NodeStore>,
) {
    if config.nodes.local_echo && keyboard.just_pressed(KeyCode::Escape) {
        store.set_selected(None);
    }
}
