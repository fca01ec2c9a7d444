use bevy::math::{Vec2, Vec3};
use dream_render_engine::engine::connections::{ConnectionBuffer, ConnectionGraphBuilder};
use dream_render_engine::engine::core::config::{
    ConnectionSettings, EngineConfig, FormationSettings, ParticleSettings,
};
use dream_render_engine::engine::core::error::{EngineError, ViewportError};
use dream_render_engine::engine::formation::{
    FormationController, FormationEvent, FormationPhase, FormationTimeline,
};
use dream_render_engine::engine::nodes::billboard::{BillboardState, ImageLoad};
use dream_render_engine::engine::nodes::metrics::platform_scale;
use dream_render_engine::engine::nodes::visual_kind::resolve_visual;
use dream_render_engine::engine::nodes::{NodeStore, VisualNode, VisualizationKind};
use dream_render_engine::engine::particles::pool::ParticlePool;
use dream_render_engine::DreamEngine;

const FRAME: f32 = 1.0 / 60.0;

#[test]
fn ambient_pool_stays_finite_for_twenty_seconds() {
    let settings = ParticleSettings {
        count: 400,
        ..ParticleSettings::default()
    };
    let mut pool = ParticlePool::with_seed(settings, 7);

    for _ in 0..(20 * 60) {
        pool.update(FRAME);
        for particle in pool.particles() {
            assert!(particle.position.is_finite(), "{:?}", particle.position);
            assert!(particle.life >= 0.0);
            assert!(particle.life <= particle.max_life);
        }
    }
    assert_eq!(pool.active_count(), 400);
}

#[test]
fn connection_exists_iff_within_threshold() {
    let settings = ConnectionSettings {
        distance_threshold: 120.0,
        window: 8,
        max_connections: 16,
        line_opacity: 0.2,
    };
    let builder = ConnectionGraphBuilder::new(&settings);
    let mut buffer = ConnectionBuffer::with_capacity(settings.max_connections);

    let near = [Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)];
    assert_eq!(builder.rebuild(&near, near.len(), &mut buffer), 1);
    assert!(buffer.contains(0, 1));

    let far = [Vec3::ZERO, Vec3::new(200.0, 0.0, 0.0)];
    assert_eq!(builder.rebuild(&far, far.len(), &mut buffer), 0);
    assert!(!buffer.contains(0, 1));
}

fn formation_settings() -> FormationSettings {
    FormationSettings {
        count: 64,
        fallback_ceiling: 6.0,
        ..FormationSettings::default()
    }
}

#[test]
fn failing_formed_callback_still_reaches_locked() {
    let mut controller = FormationController::with_seed(formation_settings(), &[[1.0; 3]], 3);
    controller.set_callback(
        FormationEvent::Formed,
        Box::new(|| -> Result<(), String> { Err("host rejected formed".into()) }),
    );
    assert!(controller.trigger(FormationTimeline::starting_at(0.0, 1.5)));

    let mut now = 0.0;
    let mut frame = 0;
    while now < 1.5 + FRAME {
        frame += 1;
        now = frame as f32 * FRAME;
        controller.advance(now);
    }
    assert_eq!(controller.phase(), FormationPhase::Formed);

    while now < 6.0 + FRAME {
        frame += 1;
        now = frame as f32 * FRAME;
        controller.advance(now);
    }
    assert_eq!(controller.phase(), FormationPhase::Locked);
    let events: Vec<_> = controller.drain_events().collect();
    assert_eq!(
        events,
        [
            FormationEvent::FormingStart,
            FormationEvent::Formed,
            FormationEvent::Locked
        ]
    );
}

#[test]
fn locked_formation_is_frozen_bit_for_bit() {
    let mut controller = FormationController::with_seed(formation_settings(), &[[1.0; 3]], 9);
    controller.trigger(FormationTimeline::starting_at(0.0, 0.5));
    for frame in 1..=90 {
        controller.advance(frame as f32 * FRAME);
    }
    assert!(controller.lock());

    let positions: Vec<[u32; 3]> = controller
        .positions()
        .iter()
        .map(|p| p.to_array().map(f32::to_bits))
        .collect();
    let buffered = controller.buffers().positions().to_vec();

    for frame in 91..191 {
        controller.advance(frame as f32 * FRAME);
    }
    let after: Vec<[u32; 3]> = controller
        .positions()
        .iter()
        .map(|p| p.to_array().map(f32::to_bits))
        .collect();
    assert_eq!(positions, after);
    assert_eq!(buffered, controller.buffers().positions());
}

#[test]
fn unreachable_image_falls_back_to_plane() {
    let node = VisualNode {
        visualization_kind: VisualizationKind::Image,
        image_url: Some("https://unreachable.invalid/goal.png".into()),
        ..VisualNode::new("goal", Vec3::ZERO)
    };
    let mut billboard = BillboardState::initial(&resolve_visual(&node));
    assert!(billboard.awaits_image());
    assert!(billboard.shows_plane());

    assert!(billboard.observe(ImageLoad::Failed));
    assert_eq!(billboard, BillboardState::FallbackPlane);
}

#[test]
fn platform_scale_is_bounded_and_monotonic() {
    assert!((platform_scale(0.0) - 0.8).abs() < 1e-6);
    assert!((platform_scale(100.0) - 1.3).abs() < 1e-6);

    let mut previous = platform_scale(0.0);
    for step in 1..=100 {
        let scale = platform_scale(step as f32);
        assert!(scale >= previous);
        previous = scale;
    }
    for wild in [150.0, -20.0, f32::INFINITY, f32::NAN] {
        let scale = platform_scale(wild);
        assert!(scale.is_finite());
        assert!((0.8..=1.3).contains(&scale));
    }
}

#[test]
fn store_clamps_out_of_range_progress() {
    let mut store = NodeStore::default();
    store.upsert(VisualNode {
        progress: 150.0,
        ..VisualNode::new("over", Vec3::ONE)
    });
    assert_eq!(store.get("over").map(|n| n.progress), Some(100.0));
}

fn small_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.particles.count = 120;
    config.particles.seed = Some(11);
    config.flow.curve_count = 3;
    config.flow.segments = 32;
    config.flow.seed = Some(12);
    config.formation.count = 48;
    config.formation.seed = Some(13);
    config
}

#[test]
fn degenerate_resize_keeps_previous_flow_points() {
    let mut engine = DreamEngine::new(small_config()).unwrap();
    engine.start(Vec2::new(1024.0, 768.0)).unwrap();
    engine.advance(FRAME).unwrap();

    let before: Vec<Vec2> = engine.parts().unwrap().flow.path(0).to_vec();
    assert!(matches!(
        engine.on_resize(0.0, 768.0),
        Err(EngineError::Viewport(ViewportError::Degenerate { .. }))
    ));
    let parts = engine.parts().unwrap();
    assert_eq!(parts.flow.path(0), before.as_slice());
    assert_eq!(parts.flow.viewport(), Vec2::new(1024.0, 768.0));

    engine.on_resize(800.0, 600.0).unwrap();
    let parts = engine.parts().unwrap();
    assert_eq!(parts.flow.viewport(), Vec2::new(800.0, 600.0));
    assert!(parts.flow.path(0).iter().all(|p| p.is_finite()));
}

#[test]
fn engine_frame_keeps_every_buffer_consistent() {
    let mut engine = DreamEngine::new(small_config()).unwrap();
    engine.start(Vec2::new(1280.0, 720.0)).unwrap();
    engine.start_formation(1.0).unwrap();

    for _ in 0..(5 * 60) {
        engine.advance(FRAME).unwrap();
    }
    let parts = engine.parts().unwrap();
    assert!(parts.particle_buffers.positions().iter().all(|p| p.is_finite()));
    assert!(parts.connections.active_count() <= parts.connections.capacity());
    for connection in parts.connections.active() {
        assert!(connection.start.distance(connection.end) < small_config().connections.distance_threshold);
    }
    assert_eq!(parts.formation.phase(), FormationPhase::Formed);

    assert!(engine.stop());
    assert!(!engine.is_running());
}
