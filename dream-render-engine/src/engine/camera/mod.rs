//! Camera rig: auto-orbit, eased targeting of the selected node and
//! constrained free orbit.

pub mod camera_rig;
pub mod rig_controller;

use bevy::prelude::*;

use crate::engine::core::app_state::EngineState;
use crate::engine::systems::frame_driver::FrameSet;
pub use camera_rig::{CameraRig, RigMode};
pub use rig_controller::RigCamera;

pub struct CameraRigPlugin;

impl Plugin for CameraRigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(EngineState::Running), rig_controller::insert_camera_rig)
            .add_systems(
                Update,
                (rig_controller::toggle_auto_orbit, rig_controller::drive_camera_rig)
                    .chain()
                    .in_set(FrameSet::Camera),
            );
    }
}
