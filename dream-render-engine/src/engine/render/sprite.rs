//! CPU mirror of the point-sprite shader math in
//! `assets/shaders/point_sprite.wgsl`.

use constants::render_settings::{SPRITE_EDGE_START, SPRITE_GLOW_FALLOFF, SPRITE_RADIUS};

/// Global pulsation `1 + depth * sin(rate * t)`.
#[inline]
pub fn breathe(time: f32, depth: f32, rate: f32) -> f32 {
    1.0 + depth * (rate * time).sin()
}

/// Screen-space point size in pixels, `None` behind the camera.
#[inline]
pub fn point_screen_size(size: f32, breathe: f32, focal: f32, view_z: f32) -> Option<f32> {
    if view_z >= 0.0 {
        return None;
    }
    Some(size * breathe * (focal / -view_z))
}

/// Hermite smoothstep as WGSL defines it.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fragment alpha at normalised distance `dist` from the sprite centre,
/// `None` where the fragment is discarded.
#[inline]
pub fn sprite_alpha(dist: f32, opacity: f32) -> Option<f32> {
    if dist > SPRITE_RADIUS {
        return None;
    }
    Some((1.0 - smoothstep(SPRITE_EDGE_START, SPRITE_RADIUS, dist)) * opacity)
}

/// Additive glow term `exp(-3 dist)`.
#[inline]
pub fn sprite_glow(dist: f32) -> f32 {
    (-SPRITE_GLOW_FALLOFF * dist).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_attenuates_with_depth() {
        let near = point_screen_size(3.0, 1.0, 300.0, -10.0).unwrap();
        let far = point_screen_size(3.0, 1.0, 300.0, -20.0).unwrap();
        assert_eq!(near, 90.0);
        assert_eq!(far, 45.0);
        assert_eq!(point_screen_size(3.0, 1.0, 300.0, 0.0), None);
        assert_eq!(point_screen_size(3.0, 1.0, 300.0, 5.0), None);
    }

    #[test]
    fn breathing_stays_within_two_percent() {
        for step in 0..100 {
            let b = breathe(step as f32 * 0.37, 0.02, 0.5);
            assert!((0.98..=1.02).contains(&b));
        }
        assert_eq!(breathe(0.0, 0.02, 0.5), 1.0);
    }

    #[test]
    fn sprite_edges() {
        assert_eq!(sprite_alpha(0.0, 0.6), Some(0.6));
        assert_eq!(sprite_alpha(0.2, 0.6), Some(0.6));
        assert_eq!(sprite_alpha(0.5, 0.6), Some(0.0));
        assert_eq!(sprite_alpha(0.51, 0.6), None);
        let mid = sprite_alpha(0.35, 1.0).unwrap();
        assert!((mid - 0.5).abs() < 1e-5);
    }

    #[test]
    fn glow_decays() {
        assert_eq!(sprite_glow(0.0), 1.0);
        assert!(sprite_glow(0.5) < sprite_glow(0.25));
    }
}
