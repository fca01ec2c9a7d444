use bevy::math::Vec3;
use constants::particles::{DEPTH_LAYERS, LAYER_SPACING};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::particle::{Particle, opacity_envelope};
use crate::engine::core::config::{ParticleSettings, ValueRange};
use crate::engine::render::point_buffers::PointBuffers;

/// Fixed-capacity ambient particle pool.
///
/// Field coordinates: `x` spans `[-width/2, width/2]`, `y` rises from `0` to
/// `height`, each depth layer sits `LAYER_SPACING` further along -Z.
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Slots `0..active` are simulated; the rest wait for the emission ramp.
    active: usize,
    emission_budget: f32,
    settings: ParticleSettings,
    width: f32,
    height: f32,
    rng: StdRng,
}

impl ParticlePool {
    pub fn new(settings: ParticleSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(settings, rng)
    }

    pub fn with_seed(settings: ParticleSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: ParticleSettings, rng: StdRng) -> Self {
        let capacity = settings.count;
        let mut pool = Self {
            particles: vec![Particle::default(); capacity],
            active: 0,
            emission_budget: 0.0,
            width: settings.field_width,
            height: settings.field_height,
            settings,
            rng,
        };
        if pool.settings.spawn_rate <= 0.0 {
            pool.fill();
        }
        pool
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles[..self.active]
    }

    pub fn field_extent(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Activate every remaining slot at once, spread across the field.
    pub fn fill(&mut self) {
        while self.active < self.particles.len() {
            self.spawn_at(self.active, true);
            self.active += 1;
        }
    }

    pub fn set_field_extent(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite() {
            self.width = width;
            self.height = height;
        }
    }

    /// Reset slot `index` with a freshly sampled birth state.
    ///
    /// `initial` spreads the birth height over the whole field (first fill);
    /// otherwise the particle is born just below the field.
    pub fn spawn_at(&mut self, index: usize, initial: bool) {
        let half_width = self.width * 0.5;
        let layer = self.rng.gen_range(0..DEPTH_LAYERS);
        let y = if initial {
            self.rng.gen_range(0.0..=self.height)
        } else {
            -self.rng.gen_range(0.0..=self.settings.margin)
        };
        let position = Vec3::new(
            self.rng.gen_range(-half_width..=half_width),
            y,
            -(layer as f32) * LAYER_SPACING + self.rng.gen_range(-0.5..=0.5),
        );

        let velocity = Vec3::new(
            sample(&mut self.rng, self.settings.velocity_min[0], self.settings.velocity_max[0]),
            sample(&mut self.rng, self.settings.velocity_min[1], self.settings.velocity_max[1]),
            sample(&mut self.rng, self.settings.velocity_min[2], self.settings.velocity_max[2]),
        );

        let base_size = if self.rng.r#gen::<f32>() < self.settings.accent_fraction {
            self.settings.accent_size
        } else {
            self.settings.base_size
        };

        let color = match self.settings.palette.len() {
            0 => Vec3::ONE,
            len => Vec3::from_array(self.settings.palette[self.rng.gen_range(0..len)]),
        };

        let base_opacity = sample_range(&mut self.rng, self.settings.opacity);
        let max_life = sample_range(&mut self.rng, self.settings.lifespan);

        self.particles[index] = Particle {
            position,
            velocity,
            color,
            base_size,
            base_opacity,
            opacity: 0.0,
            life: 0.0,
            max_life,
            layer,
        };
    }

    /// Advance every active particle by `dt` seconds, recycling those that
    /// expired or left the field. Never allocates.
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        self.ramp(dt);

        for index in 0..self.active {
            self.particles[index].step(dt);
            let particle = &self.particles[index];
            if particle.is_expired() || self.out_of_bounds(particle) {
                self.spawn_at(index, false);
            }
        }
    }

    fn ramp(&mut self, dt: f32) {
        if self.active == self.particles.len() {
            return;
        }
        self.emission_budget += self.settings.spawn_rate * dt;
        while self.emission_budget >= 1.0 && self.active < self.particles.len() {
            self.spawn_at(self.active, true);
            self.active += 1;
            self.emission_budget -= 1.0;
        }
    }

    fn out_of_bounds(&self, particle: &Particle) -> bool {
        let margin = self.settings.margin;
        let position = particle.position;
        !position.is_finite()
            || position.y > self.height + margin
            || position.x.abs() > self.width * 0.5 + margin
    }

    /// Copy render state into `buffers`; inactive slots are hidden.
    pub fn write_buffers(&self, buffers: &mut PointBuffers) {
        let slots = buffers.len().min(self.particles.len());
        for index in 0..slots {
            if index < self.active {
                let p = &self.particles[index];
                let opacity = opacity_envelope(p.base_opacity, p.life, p.max_life);
                buffers.write(index, p.position, p.color, p.base_size, opacity);
            } else {
                buffers.hide(index);
            }
        }
        buffers.mark_dirty();
    }
}

fn sample(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

fn sample_range(rng: &mut StdRng, range: ValueRange) -> f32 {
    sample(rng, range.min, range.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ParticleSettings {
        ParticleSettings {
            count: 64,
            spawn_rate: 0.0,
            ..ParticleSettings::default()
        }
    }

    #[test]
    fn instant_fill_when_spawn_rate_is_zero() {
        let pool = ParticlePool::with_seed(settings(), 7);
        assert_eq!(pool.active_count(), 64);
        assert_eq!(pool.capacity(), 64);
    }

    #[test]
    fn emission_ramp_is_rate_limited() {
        let mut pool = ParticlePool::with_seed(
            ParticleSettings {
                spawn_rate: 10.0,
                ..settings()
            },
            7,
        );
        assert_eq!(pool.active_count(), 0);
        pool.update(0.5);
        assert_eq!(pool.active_count(), 5);
        pool.update(100.0);
        assert_eq!(pool.active_count(), 64);
    }

    #[test]
    fn expired_particle_is_respawned_below_field() {
        let mut pool = ParticlePool::with_seed(settings(), 3);
        pool.particles[0].life = pool.particles[0].max_life;
        pool.particles[0].velocity = Vec3::ZERO;
        pool.update(0.01);

        let p = pool.particles()[0];
        assert_eq!(p.life, 0.0);
        assert!(p.position.y <= 0.0);
        assert!(p.position.y >= -pool.settings.margin);
    }

    #[test]
    fn particle_leaving_the_top_is_respawned() {
        let mut pool = ParticlePool::with_seed(settings(), 11);
        let (_, height) = pool.field_extent();
        pool.particles[5].position.y = height + pool.settings.margin + 1.0;
        pool.particles[5].life = 2.0;
        pool.update(0.016);
        assert!(pool.particles()[5].position.y <= 0.0);
        assert_eq!(pool.particles()[5].life, 0.0);
    }

    #[test]
    fn respawn_redraws_birth_state() {
        let mut pool = ParticlePool::with_seed(settings(), 5);
        let before = pool.particles()[0];
        pool.spawn_at(0, false);
        let after = pool.particles()[0];
        assert_ne!(before.position, after.position);
        assert_ne!(before.velocity, after.velocity);
    }

    #[test]
    fn sizes_are_bimodal() {
        let pool = ParticlePool::with_seed(
            ParticleSettings {
                count: 2000,
                ..settings()
            },
            9,
        );
        let base = pool.settings.base_size;
        let accent = pool.settings.accent_size;
        let accents = pool
            .particles()
            .iter()
            .filter(|p| p.base_size == accent)
            .count();
        assert!(pool.particles().iter().all(|p| p.base_size == base || p.base_size == accent));
        assert!(accents > 0 && accents < 400, "accent count {accents}");
    }

    #[test]
    fn write_buffers_hides_inactive_slots() {
        let mut pool = ParticlePool::with_seed(
            ParticleSettings {
                spawn_rate: 4.0,
                ..settings()
            },
            1,
        );
        pool.update(1.0);
        let mut buffers = PointBuffers::with_capacity(pool.capacity());
        buffers.take_dirty();
        pool.write_buffers(&mut buffers);
        assert!(buffers.is_dirty());
        assert!(buffers.opacities()[pool.active_count()..].iter().all(|&o| o == 0.0));
    }
}
