use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::core::config::{ENGINE_CONFIG_PATH, EngineConfig};
use crate::engine::core::engine::DreamEngine;
use crate::engine::loading::progress::LoadingProgress;

#[derive(Resource, Default)]
pub struct EngineConfigLoader {
    handle: Option<Handle<EngineConfig>>,
}

// Start the loading process
pub fn start_loading(
    mut loader: ResMut<EngineConfigLoader>,
    mut progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
) {
    loader.handle = Some(asset_server.load(ENGINE_CONFIG_PATH));
    progress.config_requested = true;
}

/// Resolve the configuration once the asset settles. A missing, malformed or
/// invalid file falls back to defaults; the engine always starts.
pub fn resolve_engine_config(
    mut commands: Commands,
    mut progress: ResMut<LoadingProgress>,
    loader: Res<EngineConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<EngineConfig>>,
) {
    if progress.config_resolved {
        return;
    }
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    let config = if let Some(config) = configs.get(handle) {
        info!("✓ Engine config loaded from {}", ENGINE_CONFIG_PATH);
        config.clone()
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle.id()) {
        warn!("Engine config unavailable ({}), using defaults", error);
        EngineConfig::default()
    } else {
        return;
    };
    progress.config_resolved = true;

    let engine = match DreamEngine::new(config) {
        Ok(engine) => engine,
        Err(error) => {
            warn!("Engine config rejected: {}, using defaults", error);
            match DreamEngine::new(EngineConfig::default()) {
                Ok(engine) => engine,
                Err(error) => {
                    error!("Default engine config rejected: {}", error);
                    return;
                }
            }
        }
    };

    commands.insert_resource(ClearColor(Color::srgb_from_array(
        engine.config().render.background,
    )));
    commands.insert_resource(engine.config().clone());
    commands.insert_resource(engine);
    progress.engine_ready = true;
}
