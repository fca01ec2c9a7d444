use bevy::prelude::*;

use crate::engine::core::engine::DreamEngine;
use crate::engine::nodes::NodeStore;
use crate::engine::render::render_plugin::EngineRenderRoot;

/// F1 dumps a snapshot of the engine buffers to the log.
pub fn debug_engine_stats(
    keyboard: Res<ButtonInput<KeyCode>>,
    engine: Res<DreamEngine>,
    store: Res<NodeStore>,
    roots: Query<Entity, With<EngineRenderRoot>>,
) {
    if !keyboard.just_pressed(KeyCode::F1) {
        return;
    }
    let Some(parts) = engine.parts() else {
        info!("=== ENGINE STATS === not running");
        return;
    };

    info!("=== ENGINE STATS ===");
    info!("Clock: {:.2}s", parts.elapsed);
    info!(
        "Particles: {} active of {}",
        parts.pool.active_count(),
        parts.pool.capacity()
    );
    info!(
        "Connections: {} of {} slots, {} dropped",
        parts.connections.active_count(),
        parts.connections.capacity(),
        parts.connections.dropped_count()
    );
    info!(
        "Flow: {} curves, {} path points, viewport {}",
        parts.flow.curves().len(),
        parts.flow.path_len(),
        parts.flow.viewport()
    );
    info!(
        "Formation: {:?}, {} pending timers, fallback armed: {}",
        parts.formation.phase(),
        parts.formation.pending_tasks(),
        parts.formation.fallback_pending()
    );
    info!("Nodes: {} (revision {})", store.len(), store.revision());
    info!("Render roots: {}", roots.iter().count());
}
