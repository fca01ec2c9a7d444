use bevy::math::Vec3;
use constants::particles::{FADE_IN_SECONDS, FADE_OUT_SECONDS, LAYER_SPEED_FALLOFF};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
    pub base_size: f32,
    pub base_opacity: f32,
    pub opacity: f32,
    /// Elapsed seconds since spawn, never negative.
    pub life: f32,
    pub max_life: f32,
    /// Depth layer in `0..DEPTH_LAYERS`, 0 is frontmost.
    pub layer: u8,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: Vec3::ONE,
            base_size: 1.0,
            base_opacity: 1.0,
            opacity: 0.0,
            life: 0.0,
            max_life: 1.0,
            layer: 0,
        }
    }
}

impl Particle {
    /// Advance by `dt` seconds and refresh the opacity envelope.
    #[inline]
    pub fn step(&mut self, dt: f32) {
        self.life += dt;
        self.position += self.velocity * layer_speed_factor(self.layer) * dt;
        self.opacity = opacity_envelope(self.base_opacity, self.life, self.max_life);
    }

    pub fn is_expired(&self) -> bool {
        self.life > self.max_life
    }
}

/// Back layers drift slower: `1 - layer * 0.2`.
#[inline]
pub fn layer_speed_factor(layer: u8) -> f32 {
    1.0 - layer as f32 * LAYER_SPEED_FALLOFF
}

/// Linear fade-in over the first second, linear fade-out over the last two,
/// `base` in between. Continuous at both breakpoints.
#[inline]
pub fn opacity_envelope(base: f32, life: f32, max_life: f32) -> f32 {
    if life < FADE_IN_SECONDS {
        base * life.max(0.0) / FADE_IN_SECONDS
    } else if life > max_life - FADE_OUT_SECONDS {
        base * (max_life - life).max(0.0) / FADE_OUT_SECONDS
    } else {
        base
    }
}
