use bevy::log::{info, warn};
use bevy::math::{Quat, Vec3};
use constants::formation::{PULSE_DEPTH, PULSE_INDEX_PHASE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::callbacks::{PhaseCallback, PhaseCallbacks};
use super::phase::{FormationEvent, FormationPhase, FormationTimeline};
use super::targets::{fibonacci_sphere, scatter_into};
use super::tasks::{DelayedTasks, TaskHandle};
use crate::engine::core::config::FormationSettings;
use crate::engine::render::point_buffers::PointBuffers;

/// Timed transitions armed by [`FormationController::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    BeginForming,
    BeginFormed,
    /// Fallback ceiling, fires regardless of callbacks.
    ForceLock,
}

/// Drives the dedicated formation particle set.
///
/// Positions are local to `origin`; the point buffers hold world positions.
pub struct FormationController {
    settings: FormationSettings,
    origin: Vec3,
    phase: FormationPhase,
    positions: Vec<Vec3>,
    targets: Vec<Vec3>,
    /// Pre-rotation, pre-pulse positions once formed.
    rest: Vec<Vec3>,
    colors: Vec<Vec3>,
    buffers: PointBuffers,
    timeline: Option<FormationTimeline>,
    tasks: DelayedTasks<Transition>,
    fallback: Option<TaskHandle>,
    callbacks: PhaseCallbacks,
    outbox: Vec<FormationEvent>,
    rotation: f32,
    last_time: Option<f32>,
    rng: StdRng,
}

impl FormationController {
    pub fn new(settings: FormationSettings, palette: &[[f32; 3]]) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(settings, palette, rng)
    }

    pub fn with_seed(settings: FormationSettings, palette: &[[f32; 3]], seed: u64) -> Self {
        Self::with_rng(settings, palette, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: FormationSettings, palette: &[[f32; 3]], mut rng: StdRng) -> Self {
        let count = settings.count;
        let colors = (0..count)
            .map(|_| match palette.len() {
                0 => Vec3::ONE,
                len => Vec3::from_array(palette[rng.gen_range(0..len)]),
            })
            .collect();

        let mut controller = Self {
            origin: Vec3::from_array(settings.origin),
            phase: FormationPhase::Scattered,
            positions: vec![Vec3::ZERO; count],
            targets: fibonacci_sphere(count, settings.target_radius),
            rest: vec![Vec3::ZERO; count],
            colors,
            buffers: PointBuffers::with_capacity(count),
            timeline: None,
            tasks: DelayedTasks::default(),
            fallback: None,
            callbacks: PhaseCallbacks::default(),
            outbox: Vec::new(),
            rotation: 0.0,
            last_time: None,
            settings,
            rng,
        };
        controller.scatter();
        controller
    }

    pub fn phase(&self) -> FormationPhase {
        self.phase
    }

    pub fn timeline(&self) -> Option<FormationTimeline> {
        self.timeline
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    pub fn buffers(&self) -> &PointBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut PointBuffers {
        &mut self.buffers
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the fallback lock armed by [`trigger`](Self::trigger) can
    /// still fire.
    pub fn fallback_pending(&self) -> bool {
        self.fallback
            .is_some_and(|handle| self.tasks.is_pending(handle))
    }

    pub fn set_callback(&mut self, event: FormationEvent, callback: PhaseCallback) {
        self.callbacks.set(event, callback);
    }

    /// Replace the target shape, local to the formation origin. Shorter
    /// inputs repeat; an empty slice is ignored.
    pub fn set_targets(&mut self, targets: &[Vec3]) {
        if targets.is_empty() {
            return;
        }
        for (i, target) in self.targets.iter_mut().enumerate() {
            *target = targets[i % targets.len()];
        }
    }

    /// Arm the ceremony. Only valid from an untriggered Scattered state.
    ///
    /// Schedules the Forming and Formed boundaries from `timeline` plus the
    /// fallback lock at `forming_start + fallback_ceiling`.
    pub fn trigger(&mut self, timeline: FormationTimeline) -> bool {
        if self.phase != FormationPhase::Scattered || self.timeline.is_some() {
            return false;
        }
        let timeline = timeline.normalized();
        self.timeline = Some(timeline);
        self.tasks.schedule(timeline.forming_start, Transition::BeginForming);
        self.tasks.schedule(timeline.formed_at, Transition::BeginFormed);
        self.fallback = Some(self.tasks.schedule(
            timeline.forming_start + self.settings.fallback_ceiling,
            Transition::ForceLock,
        ));
        self.write_buffers();
        true
    }

    /// Advance to clock `now` (seconds).
    ///
    /// Fires due transitions, then mutates positions for the current phase.
    /// A Locked set is never touched.
    pub fn advance(&mut self, now: f32) {
        if self.phase == FormationPhase::Locked || !now.is_finite() {
            return;
        }
        let dt = self.last_time.map_or(0.0, |last| (now - last).max(0.0));
        self.last_time = Some(now);

        while let Some((_, transition)) = self.tasks.pop_due(now) {
            self.apply(transition);
            if self.phase == FormationPhase::Locked {
                return;
            }
        }

        match self.phase {
            FormationPhase::Scattered | FormationPhase::Locked => return,
            FormationPhase::Forming => self.converge(),
            FormationPhase::Formed => self.orbit(now, dt),
        }
        self.write_buffers();
    }

    /// Enter Locked. Idempotent: returns `false` if already locked.
    pub fn lock(&mut self) -> bool {
        if self.phase == FormationPhase::Locked {
            return false;
        }
        self.tasks.clear();
        self.fallback = None;
        self.enter(FormationEvent::Locked);
        true
    }

    /// Back to an untriggered Scattered state with fresh positions.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.fallback = None;
        self.timeline = None;
        self.phase = FormationPhase::Scattered;
        self.rotation = 0.0;
        self.last_time = None;
        self.scatter();
    }

    /// Cancel every pending transition, fallback included.
    pub fn stop(&mut self) {
        self.tasks.clear();
        self.fallback = None;
    }

    /// Phase events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, FormationEvent> {
        self.outbox.drain(..)
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::BeginForming => {
                if self.phase == FormationPhase::Scattered {
                    self.enter(FormationEvent::FormingStart);
                }
            }
            Transition::BeginFormed => {
                if self.phase == FormationPhase::Scattered {
                    self.enter(FormationEvent::FormingStart);
                }
                if self.phase == FormationPhase::Forming {
                    self.rest.copy_from_slice(&self.positions);
                    self.enter(FormationEvent::Formed);
                }
            }
            Transition::ForceLock => {
                self.fallback = None;
                if self.lock() {
                    info!("Formation fallback ceiling reached, forced lock");
                }
            }
        }
    }

    fn enter(&mut self, event: FormationEvent) {
        self.phase = event.phase();
        self.outbox.push(event);
        if let Err(error) = self.callbacks.invoke(event) {
            warn!("Formation {} callback: {}", event.label(), error);
        }
    }

    fn converge(&mut self) {
        let rate = self.settings.convergence_rate;
        for (position, target) in self.positions.iter_mut().zip(&self.targets) {
            *position += (*target - *position) * rate;
        }
    }

    /// Shared rotation about +Y and per-particle radial pulse, derived from
    /// `rest` each frame so nothing accumulates.
    fn orbit(&mut self, now: f32, dt: f32) {
        let rate = self.settings.convergence_rate;
        for (rest, target) in self.rest.iter_mut().zip(&self.targets) {
            *rest += (*target - *rest) * rate;
        }

        self.rotation += dt * self.settings.rotation_speed;
        let rotation = Quat::from_rotation_y(self.rotation);
        for (i, (position, rest)) in self.positions.iter_mut().zip(&self.rest).enumerate() {
            let scale = 1.0 + (now + i as f32 * PULSE_INDEX_PHASE).sin() * PULSE_DEPTH;
            *position = rotation * *rest * scale;
        }
    }

    fn scatter(&mut self) {
        scatter_into(&mut self.rng, self.settings.scatter_extent, &mut self.positions);
        self.rest.copy_from_slice(&self.positions);
        self.write_buffers();
    }

    /// Points stay hidden until the ceremony is armed.
    fn write_buffers(&mut self) {
        let opacity = if self.timeline.is_some() {
            self.settings.opacity
        } else {
            0.0
        };
        for (i, position) in self.positions.iter().enumerate() {
            self.buffers.write(
                i,
                self.origin + *position,
                self.colors[i],
                self.settings.point_size,
                opacity,
            );
        }
        self.buffers.mark_dirty();
    }
}
