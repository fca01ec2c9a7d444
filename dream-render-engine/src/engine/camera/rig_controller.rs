use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use super::camera_rig::CameraRig;
use crate::engine::core::config::EngineConfig;
use crate::engine::nodes::NodeStore;

/// Main 3D camera driven by the rig.
#[derive(Component)]
pub struct RigCamera;

pub fn insert_camera_rig(mut commands: Commands, config: Res<EngineConfig>) {
    commands.insert_resource(CameraRig::new(config.camera.clone()));
}

/// Feed selection, drag and scroll into the rig, then write the camera
/// transform.
pub fn drive_camera_rig(
    time: Res<Time>,
    store: Res<NodeStore>,
    mut rig: ResMut<CameraRig>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut camera_query: Query<&mut Transform, With<RigCamera>>,
) {
    let selected = store
        .selected()
        .map(|node| (node.id.as_str(), node.translation()));
    rig.advance(time.delta_secs(), selected);

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) {
        rig.apply_drag(mouse_delta);
    }

    // Pixel deltas are scaled down to roughly one line per notch.
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    rig.apply_zoom(scroll_accum);

    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = rig.transform();
    }
}

/// O toggles auto-orbit.
pub fn toggle_auto_orbit(keyboard: Res<ButtonInput<KeyCode>>, mut rig: ResMut<CameraRig>) {
    if keyboard.just_pressed(KeyCode::KeyO) {
        let enabled = !rig.orbit_enabled();
        rig.set_orbit_enabled(enabled);
        info!("Auto-orbit {}", if enabled { "enabled" } else { "disabled" });
    }
}
