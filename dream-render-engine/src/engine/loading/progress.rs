use bevy::prelude::*;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    pub config_requested: bool,
    /// Loaded from disk, or fallen back to defaults.
    pub config_resolved: bool,
    pub engine_ready: bool,
    pub nodes_seeded: bool,
}
