use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;

/// Engine lifecycle. Entering `Running` allocates every buffer and render
/// entity; leaving it releases them.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum EngineState {
    #[default]
    Loading,
    Running,
    Stopped,
}

#[derive(Component)]
pub struct FpsText;

/// Leave `Loading` once configuration is resolved and the engine resource
/// exists.
pub fn transition_to_running(
    progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<EngineState>>,
) {
    if progress.engine_ready {
        info!("→ Engine configured, transitioning to Running state");
        next_state.set(EngineState::Running);
    }
}
