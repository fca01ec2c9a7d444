//! Progress-derived visual quantities. Every function is total: non-finite
//! progress reads as zero and out-of-range progress saturates.

use std::f32::consts::TAU;

use constants::nodes::{
    FOCUS_SCALE, PLATFORM_BASE_SCALE, PLATFORM_PROGRESS_SCALE, RISING_HEIGHT,
};

/// `progress / 100`, saturated to `[0, 1]`.
#[inline]
pub fn progress_factor(progress: f32) -> f32 {
    if progress.is_finite() {
        (progress / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `0.8` at zero progress, `1.3` at full.
#[inline]
pub fn platform_scale(progress: f32) -> f32 {
    PLATFORM_BASE_SCALE + progress_factor(progress) * PLATFORM_PROGRESS_SCALE
}

/// Progress ring arc in radians.
#[inline]
pub fn ring_arc(progress: f32) -> f32 {
    progress_factor(progress) * TAU
}

pub fn billboard_scale(progress: f32, focused: bool) -> f32 {
    let focus = if focused { FOCUS_SCALE } else { 1.0 };
    platform_scale(progress) * focus
}

pub fn light_intensity(base: f32, progress: f32) -> f32 {
    base * platform_scale(progress)
}

/// Sawtooth height in `[0, RISING_HEIGHT)`.
#[inline]
pub fn rising_height(time: f32, speed: f32, offset: f32) -> f32 {
    (time * speed + offset).rem_euclid(RISING_HEIGHT)
}

/// Linear fade as the particle climbs.
#[inline]
pub fn rising_opacity(base: f32, height: f32) -> f32 {
    base * (1.0 - height / RISING_HEIGHT).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_scale_endpoints() {
        assert_eq!(platform_scale(0.0), 0.8);
        assert!((platform_scale(100.0) - 1.3).abs() < 1e-6);
    }

    #[test]
    fn platform_scale_is_monotonic() {
        let mut previous = platform_scale(0.0);
        for step in 1..=1000 {
            let scale = platform_scale(step as f32 * 0.1);
            assert!(scale >= previous);
            previous = scale;
        }
    }

    #[test]
    fn out_of_range_progress_is_bounded() {
        for progress in [150.0, -20.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let scale = platform_scale(progress);
            assert!((0.8..=1.3).contains(&scale), "{progress} -> {scale}");
            assert!(ring_arc(progress).is_finite());
        }
        assert!((platform_scale(150.0) - 1.3).abs() < 1e-6);
    }

    #[test]
    fn ring_arc_spans_full_circle() {
        assert_eq!(ring_arc(0.0), 0.0);
        assert!((ring_arc(50.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((ring_arc(100.0) - TAU).abs() < 1e-6);
    }

    #[test]
    fn focus_multiplies_billboard() {
        let base = billboard_scale(40.0, false);
        assert!((billboard_scale(40.0, true) - base * 1.2).abs() < 1e-6);
    }

    #[test]
    fn rising_particles_loop_and_fade() {
        assert_eq!(rising_height(0.0, 1.0, 0.0), 0.0);
        assert!((rising_height(3.5, 1.0, 0.0) - 0.5).abs() < 1e-5);
        assert_eq!(rising_opacity(0.8, 0.0), 0.8);
        assert!((rising_opacity(0.8, 1.5) - 0.4).abs() < 1e-6);
        assert_eq!(rising_opacity(0.8, 3.0), 0.0);
    }
}
