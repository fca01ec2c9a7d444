use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::engine::core::app_state::EngineState;
use crate::engine::core::engine::DreamEngine;
use crate::engine::core::error::EngineError;
use crate::engine::formation::FormationPhaseEvent;

/// Per-frame stages, chained in this order while the engine runs.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Pool update, connection rebuild, flow recompute, formation step.
    Advance,
    /// Dirty buffers copied into their mesh assets.
    Upload,
    Nodes,
    Camera,
    /// Engine events forwarded to the UI bridge.
    Bridge,
}

pub struct FrameDriverPlugin;

impl Plugin for FrameDriverPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FormationPhaseEvent>()
            .configure_sets(
                Update,
                (
                    FrameSet::Advance,
                    FrameSet::Upload,
                    FrameSet::Nodes,
                    FrameSet::Camera,
                    FrameSet::Bridge,
                )
                    .chain()
                    .run_if(in_state(EngineState::Running)),
            )
            .add_systems(OnEnter(EngineState::Running), start_engine)
            .add_systems(
                Update,
                (apply_window_resize, advance_engine)
                    .chain()
                    .in_set(FrameSet::Advance),
            )
            .add_systems(OnExit(EngineState::Running), stop_engine)
            .add_systems(Last, stop_on_app_exit);
    }
}

/// Allocate every engine buffer for the primary window. A window too small
/// to lay out the flow field parks the engine in `Stopped`.
pub fn start_engine(
    mut engine: ResMut<DreamEngine>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut next_state: ResMut<NextState<EngineState>>,
) {
    let viewport = windows
        .single()
        .map(|window| Vec2::new(window.width(), window.height()))
        .unwrap_or(Vec2::new(1280.0, 720.0));

    if let Err(error) = engine.start(viewport) {
        error!("Engine failed to start: {}", error);
        next_state.set(EngineState::Stopped);
    }
}

pub fn stop_engine(mut engine: ResMut<DreamEngine>) {
    engine.stop();
}

/// Resize is the only irregular operation; only the last event of a frame
/// matters.
pub fn apply_window_resize(
    mut resize_events: EventReader<WindowResized>,
    mut engine: ResMut<DreamEngine>,
) {
    let Some(event) = resize_events.read().last() else {
        return;
    };
    if let Err(error) = engine.on_resize(event.width, event.height) {
        warn!(
            "Resize to {}x{} ignored, keeping previous layout: {}",
            event.width, event.height, error
        );
    }
}

pub fn advance_engine(
    time: Res<Time>,
    mut engine: ResMut<DreamEngine>,
    mut phase_events: EventWriter<FormationPhaseEvent>,
) {
    match engine.advance(time.delta_secs()) {
        Ok(()) => {}
        Err(EngineError::NotRunning) => return,
        Err(error) => {
            warn!("Frame skipped: {}", error);
            return;
        }
    }
    for event in engine.drain_formation_events() {
        debug!("Formation {}", event.label());
        phase_events.write(FormationPhaseEvent(event));
    }
}

/// Release buffers and pending timers on shutdown, whatever the state.
pub fn stop_on_app_exit(mut exit_events: EventReader<AppExit>, engine: Option<ResMut<DreamEngine>>) {
    if exit_events.read().next().is_none() {
        return;
    }
    if let Some(mut engine) = engine {
        engine.stop();
    }
}
