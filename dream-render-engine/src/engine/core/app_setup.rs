// Standard library and external crates
use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::{FLOW_CAMERA_ORDER, FLOW_RENDER_LAYER};

// Crate engine modules
use crate::engine::camera::{CameraRigPlugin, RigCamera};
use crate::engine::core::app_state::{EngineState, FpsText, transition_to_running};
use crate::engine::core::config::EngineConfig;
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::config_loader::{
    EngineConfigLoader, resolve_engine_config, start_loading,
};
use crate::engine::loading::node_seed::{
    NodeSeed, NodeSeedLoader, apply_node_seed, start_node_seed_loading,
};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::nodes::NodeVisualizerPlugin;
use crate::engine::render::EngineRenderPlugin;
use crate::engine::systems::debug_stats::debug_engine_stats;
use crate::engine::systems::formation_controls::handle_formation_shortcuts;
use crate::engine::systems::fps_tracking::{fps_notification_system, fps_text_update_system};
use crate::engine::systems::frame_driver::{FrameDriverPlugin, FrameSet, advance_engine};

// Bridge
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<EngineState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Engine configuration and the optional node seed load as JSON assets.
        .add_plugins(JsonAssetPlugin::<EngineConfig>::new(&["engine.json"]))
        .add_plugins(JsonAssetPlugin::<NodeSeed>::new(&["nodes.json"]))
        .add_plugins(FrameDriverPlugin)
        .add_plugins(EngineRenderPlugin)
        .add_plugins(NodeVisualizerPlugin)
        .add_plugins(CameraRigPlugin)
        .add_plugins(WebRpcPlugin)
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 180.0,
            ..default()
        });

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<EngineConfigLoader>()
        .init_resource::<NodeSeedLoader>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading, start_node_seed_loading))
        .add_systems(
            Update,
            (resolve_engine_config, transition_to_running)
                .chain()
                .run_if(in_state(EngineState::Loading)),
        )
        .add_systems(Update, apply_node_seed);

    app.add_systems(
        Update,
        handle_formation_shortcuts
            .in_set(FrameSet::Advance)
            .before(advance_engine),
    );

    // Runtime diagnostics - only run when the engine is up
    app.add_systems(
        Update,
        (fps_notification_system, debug_engine_stats).run_if(in_state(EngineState::Running)),
    );

    // Add fps_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_text_update_system);
    }

    app
}

/// Flow ribbons draw first on their own layer; the 3D scene composites on
/// top without clearing.
fn spawn_cameras(commands: &mut Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: FLOW_CAMERA_ORDER,
            ..default()
        },
        RenderLayers::layer(FLOW_RENDER_LAYER),
    ));

    commands.spawn((
        Camera3d::default(),
        Camera {
            order: FLOW_CAMERA_ORDER + 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        Transform::from_xyz(0.0, 9.0, 22.0).looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
        RigCamera,
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_cameras(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.75, 1.0)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    // RUST_LOG overrides the filter.
    let log_config = LogPlugin {
        level: Level::INFO,
        filter: "info,wgpu=error,naga=warn,dream_render_engine=debug".to_string(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
