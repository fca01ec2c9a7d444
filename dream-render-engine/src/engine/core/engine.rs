use bevy::log::info;
use bevy::prelude::*;

use super::config::EngineConfig;
use super::error::EngineError;
use crate::engine::connections::{ConnectionBuffer, ConnectionGraphBuilder};
use crate::engine::flow::FlowField;
use crate::engine::formation::{FormationController, FormationEvent, FormationTimeline};
use crate::engine::particles::pool::ParticlePool;
use crate::engine::render::point_buffers::PointBuffers;

/// Everything allocated by [`DreamEngine::start`] and released by
/// [`DreamEngine::stop`].
pub struct EngineParts {
    pub pool: ParticlePool,
    pub particle_buffers: PointBuffers,
    pub graph: ConnectionGraphBuilder,
    pub connections: ConnectionBuffer,
    pub flow: FlowField,
    pub formation: FormationController,
    /// Engine clock in seconds since start.
    pub elapsed: f32,
}

/// Simulation core. Owns every per-frame buffer; the render layer only reads
/// them and consumes their dirty flags.
#[derive(Resource)]
pub struct DreamEngine {
    config: EngineConfig,
    parts: Option<EngineParts>,
}

impl DreamEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            parts: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.parts.is_some()
    }

    pub fn parts(&self) -> Option<&EngineParts> {
        self.parts.as_ref()
    }

    pub fn parts_mut(&mut self) -> Option<&mut EngineParts> {
        self.parts.as_mut()
    }

    pub fn elapsed(&self) -> f32 {
        self.parts.as_ref().map_or(0.0, |parts| parts.elapsed)
    }

    /// Allocate every buffer for a `viewport` in pixels. Restarting releases
    /// the previous run first.
    pub fn start(&mut self, viewport: Vec2) -> Result<(), EngineError> {
        let flow = FlowField::new(&self.config.flow, viewport.x, viewport.y)?;
        self.stop();

        let particles = &self.config.particles;
        let mut pool = ParticlePool::new(particles.clone());
        pool.set_field_extent(
            particles.field_height * viewport.x / viewport.y,
            particles.field_height,
        );
        let mut particle_buffers = PointBuffers::with_capacity(pool.capacity());
        pool.write_buffers(&mut particle_buffers);

        let formation = FormationController::new(self.config.formation.clone(), &particles.palette);

        self.parts = Some(EngineParts {
            pool,
            particle_buffers,
            graph: ConnectionGraphBuilder::new(&self.config.connections),
            connections: ConnectionBuffer::with_capacity(self.config.connections.max_connections),
            flow,
            formation,
            elapsed: 0.0,
        });
        info!(
            "Engine started: {} particles, {} flow curves, {} formation points",
            particles.count, self.config.flow.curve_count, self.config.formation.count
        );
        Ok(())
    }

    /// Cancel pending timers and release every buffer. Returns whether the
    /// engine was running.
    pub fn stop(&mut self) -> bool {
        match self.parts.take() {
            Some(mut parts) => {
                parts.formation.stop();
                info!("Engine stopped after {:.1}s", parts.elapsed);
                true
            }
            None => false,
        }
    }

    /// One frame: pool update, connection rebuild, flow recompute, formation
    /// step, in that order.
    pub fn advance(&mut self, dt: f32) -> Result<(), EngineError> {
        let parts = self.parts.as_mut().ok_or(EngineError::NotRunning)?;
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        parts.elapsed += dt;

        parts.pool.update(dt);
        parts.pool.write_buffers(&mut parts.particle_buffers);
        parts.graph.rebuild(
            parts.particle_buffers.positions(),
            parts.pool.active_count(),
            &mut parts.connections,
        );
        parts.flow.advance(parts.elapsed);
        parts.formation.advance(parts.elapsed);
        Ok(())
    }

    /// Regenerate viewport-dependent state. On error the previous flow
    /// points and particle field stay in place.
    pub fn on_resize(&mut self, width: f32, height: f32) -> Result<(), EngineError> {
        let field_height = self.config.particles.field_height;
        let parts = self.parts.as_mut().ok_or(EngineError::NotRunning)?;
        parts.flow.resize(width, height)?;
        parts.pool.set_field_extent(field_height * width / height, field_height);
        Ok(())
    }

    /// Arm the formation on the engine clock: forming starts now and lasts
    /// `forming_secs`.
    pub fn start_formation(&mut self, forming_secs: f32) -> Result<bool, EngineError> {
        let parts = self.parts.as_mut().ok_or(EngineError::NotRunning)?;
        let timeline = FormationTimeline::starting_at(parts.elapsed, forming_secs);
        Ok(parts.formation.trigger(timeline))
    }

    /// Force the formation into Locked. `Ok(false)` if it already was.
    pub fn lock_formation(&mut self) -> Result<bool, EngineError> {
        let parts = self.parts.as_mut().ok_or(EngineError::NotRunning)?;
        Ok(parts.formation.lock())
    }

    /// Return the formation to an untriggered, freshly scattered state.
    pub fn reset_formation(&mut self) -> Result<(), EngineError> {
        let parts = self.parts.as_mut().ok_or(EngineError::NotRunning)?;
        parts.formation.reset();
        Ok(())
    }

    /// Formation phase events raised since the last call, oldest first.
    pub fn drain_formation_events(&mut self) -> Vec<FormationEvent> {
        self.parts
            .as_mut()
            .map(|parts| parts.formation.drain_events().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::error::{ConfigError, ViewportError};
    use crate::engine::formation::FormationPhase;

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.particles.count = 50;
        config.particles.seed = Some(1);
        config.flow.curve_count = 2;
        config.flow.segments = 16;
        config.flow.seed = Some(2);
        config.formation.count = 32;
        config.formation.seed = Some(3);
        config
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = config();
        config.particles.palette.clear();
        assert_eq!(
            DreamEngine::new(config).err(),
            Some(EngineError::Config(ConfigError::EmptyPalette))
        );
    }

    #[test]
    fn advance_requires_start() {
        let mut engine = DreamEngine::new(config()).unwrap();
        assert_eq!(engine.advance(0.016), Err(EngineError::NotRunning));
        engine.start(Vec2::new(1280.0, 720.0)).unwrap();
        assert!(engine.advance(0.016).is_ok());
        assert!(engine.stop());
        assert!(!engine.stop());
        assert!(!engine.is_running());
    }

    #[test]
    fn degenerate_start_keeps_engine_stopped() {
        let mut engine = DreamEngine::new(config()).unwrap();
        assert!(matches!(
            engine.start(Vec2::new(0.0, 720.0)),
            Err(EngineError::Viewport(ViewportError::Degenerate { .. }))
        ));
        assert!(!engine.is_running());
    }

    #[test]
    fn resize_failure_keeps_previous_state() {
        let mut engine = DreamEngine::new(config()).unwrap();
        engine.start(Vec2::new(1280.0, 720.0)).unwrap();
        engine.advance(0.5).unwrap();
        let extent = engine.parts().unwrap().pool.field_extent();
        assert!(engine.on_resize(0.0, 0.0).is_err());
        let parts = engine.parts().unwrap();
        assert_eq!(parts.pool.field_extent(), extent);
        assert_eq!(parts.flow.viewport(), Vec2::new(1280.0, 720.0));
    }

    #[test]
    fn stop_cancels_formation_timers() {
        let mut engine = DreamEngine::new(config()).unwrap();
        engine.start(Vec2::new(800.0, 600.0)).unwrap();
        assert_eq!(engine.start_formation(1.0), Ok(true));
        engine.advance(0.1).unwrap();
        let parts = engine.parts().unwrap();
        assert_eq!(parts.formation.phase(), FormationPhase::Forming);
        assert!(parts.formation.pending_tasks() > 0);

        let parts = engine.parts_mut().unwrap();
        parts.formation.stop();
        assert_eq!(parts.formation.pending_tasks(), 0);
        engine.stop();
        assert_eq!(engine.start_formation(1.0), Err(EngineError::NotRunning));
    }

    #[test]
    fn formation_events_drain_in_order() {
        let mut engine = DreamEngine::new(config()).unwrap();
        engine.start(Vec2::new(800.0, 600.0)).unwrap();
        engine.start_formation(0.5).unwrap();
        engine.advance(0.1).unwrap();
        engine.advance(0.5).unwrap();
        assert_eq!(
            engine.drain_formation_events(),
            [FormationEvent::FormingStart, FormationEvent::Formed]
        );
        assert_eq!(engine.lock_formation(), Ok(true));
        assert_eq!(engine.lock_formation(), Ok(false));
        assert_eq!(engine.drain_formation_events(), [FormationEvent::Locked]);

        engine.reset_formation().unwrap();
        assert_eq!(
            engine.parts().unwrap().formation.phase(),
            FormationPhase::Scattered
        );
        assert_eq!(engine.start_formation(0.5), Ok(true));
    }
}
