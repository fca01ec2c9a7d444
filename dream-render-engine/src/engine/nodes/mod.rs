//! Progress-driven node visuals.
//!
//! Nodes arrive from the external data layer through [`NodeStore`]. Each one
//! renders a platform, a progress ring, rising particles, a camera-facing
//! billboard and a point light, all re-derived from progress every frame.

pub mod billboard;
pub mod events;
pub mod metrics;
pub mod picking;
pub mod store;
pub mod visual_kind;
pub mod visual_node;
pub mod visualizer;

use bevy::prelude::*;

use crate::engine::core::app_state::EngineState;
use crate::engine::systems::frame_driver::FrameSet;
pub use events::{NodeCompleted, NodeHoverEvent, NodeSelectEvent};
pub use store::NodeStore;
pub use visual_node::{VisualNode, VisualizationKind};

pub struct NodeVisualizerPlugin;

impl Plugin for NodeVisualizerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NodeStore>()
            .init_resource::<visualizer::NodeSyncState>()
            .init_resource::<picking::HoverState>()
            .add_event::<NodeHoverEvent>()
            .add_event::<NodeSelectEvent>()
            .add_event::<NodeCompleted>()
            .add_systems(Startup, visualizer::setup_node_meshes)
            .add_systems(
                Update,
                (
                    (picking::pick_nodes, picking::deselect_on_escape),
                    visualizer::sync_node_entities,
                    visualizer::poll_billboard_images,
                    visualizer::animate_nodes,
                    visualizer::emit_completed_nodes,
                )
                    .chain()
                    .in_set(FrameSet::Nodes)
                    .run_if(in_state(EngineState::Running)),
            )
            .add_systems(OnExit(EngineState::Running), visualizer::despawn_node_entities);
    }
}
