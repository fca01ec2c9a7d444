use bevy::asset::LoadState;
use bevy::prelude::*;
use serde::Deserialize;

use crate::engine::loading::progress::LoadingProgress;
use crate::engine::nodes::NodeStore;

/// Optional initial node set, relative to the asset root.
pub const NODE_SEED_PATH: &str = "nodes/dream.nodes.json";

/// Node list shipped with the app. Entries stay raw JSON so one malformed
/// node is skipped instead of failing the whole file.
#[derive(Asset, TypePath, Debug, Clone, Default, Deserialize)]
pub struct NodeSeed {
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
}

#[derive(Resource, Default)]
pub struct NodeSeedLoader {
    handle: Option<Handle<NodeSeed>>,
}

pub fn start_node_seed_loading(mut loader: ResMut<NodeSeedLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(NODE_SEED_PATH));
}

/// Seed the store once. Nodes pushed over the bridge in the meantime win.
pub fn apply_node_seed(
    mut progress: ResMut<LoadingProgress>,
    mut store: ResMut<NodeStore>,
    mut loader: ResMut<NodeSeedLoader>,
    asset_server: Res<AssetServer>,
    seeds: Res<Assets<NodeSeed>>,
) {
    if progress.nodes_seeded {
        return;
    }
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    if let Some(seed) = seeds.get(handle) {
        if store.is_empty() {
            let accepted = store.replace_all(seed.nodes.clone());
            info!("✓ Seeded {} of {} nodes", accepted, seed.nodes.len());
        }
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(handle.id()) {
        debug!("No node seed ({})", error);
    } else {
        return;
    }
    progress.nodes_seeded = true;
    loader.handle = None;
}
