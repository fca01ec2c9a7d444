use std::f32::consts::{FRAC_PI_4, PI, TAU};

use constants::flow::{WAVE_AMPLITUDE_FALLOFF, WAVE_FREQUENCY_SCALE};
use rand::Rng;

use crate::engine::core::config::{FlowSettings, ValueRange};

/// Immutable parameters of one flow curve. Identity persists for the engine
/// lifetime; only the sampled points change per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowCurve {
    /// Degrees.
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub phase: f32,
    pub speed: f32,
    /// Pixels.
    pub amplitude: f32,
    /// Cycles across the viewport width.
    pub frequency: f32,
    pub thickness: f32,
    /// Baseline offset as a fraction of viewport height, relative to centre.
    pub baseline_offset: f32,
    pub wave_count: u32,
}

impl FlowCurve {
    /// Sample a curve; baselines are spread evenly across `baseline_spread`
    /// of the height with a little jitter so neighbours never coincide.
    pub fn random(rng: &mut impl Rng, settings: &FlowSettings, index: usize, count: usize) -> Self {
        let slot = if count > 1 {
            index as f32 / (count - 1) as f32 - 0.5
        } else {
            0.0
        };
        let jitter = rng.gen_range(-0.02..=0.02);
        let wave_count = if settings.wave_layers_max > settings.wave_layers_min {
            rng.gen_range(settings.wave_layers_min..=settings.wave_layers_max)
        } else {
            settings.wave_layers_min
        };

        Self {
            hue: sample(rng, settings.hue),
            saturation: sample(rng, settings.saturation),
            lightness: sample(rng, settings.lightness),
            phase: rng.gen_range(0.0..TAU),
            speed: sample(rng, settings.speed),
            amplitude: sample(rng, settings.amplitude),
            frequency: sample(rng, settings.frequency),
            thickness: sample(rng, settings.thickness),
            baseline_offset: slot * settings.baseline_spread + jitter,
            wave_count,
        }
    }

    /// Baseline height in pixels for a viewport of `height`.
    pub fn baseline(&self, height: f32) -> f32 {
        height * 0.5 + self.baseline_offset * height
    }

    /// Vertical position at normalised `t ∈ [0, 1]` and clock `time` seconds.
    pub fn sample_y(&self, t: f32, time: f32, baseline: f32) -> f32 {
        let amp = self.amplitude;
        let drift = time * self.speed;
        let mut y = baseline;

        for w in 0..self.wave_count {
            let w = w as f32;
            let angle = t * TAU * self.frequency * (w + 1.0) * WAVE_FREQUENCY_SCALE
                + drift * (1.0 + 0.25 * w)
                + self.phase
                + w * FRAC_PI_4;
            y += angle.sin() * amp / (w + 1.0).powf(WAVE_AMPLITUDE_FALLOFF);
        }

        // Large-scale variation so the sum never looks periodic.
        y += (0.6 * PI * t + drift * 0.4).sin() * 0.35 * amp;
        y += (1.3 * PI * t + drift * 0.6).cos() * 0.25 * amp;
        y += (2.7 * PI * t + drift * 0.8).sin() * 0.15 * amp;
        y
    }
}

fn sample(rng: &mut impl Rng, range: ValueRange) -> f32 {
    if range.max > range.min {
        rng.gen_range(range.min..=range.max)
    } else {
        range.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn flat_curve() -> FlowCurve {
        FlowCurve {
            hue: 220.0,
            saturation: 0.7,
            lightness: 0.5,
            phase: 0.0,
            speed: 0.3,
            amplitude: 0.0,
            frequency: 1.0,
            thickness: 1.5,
            baseline_offset: 0.1,
            wave_count: 4,
        }
    }

    #[test]
    fn zero_amplitude_stays_on_baseline() {
        let curve = flat_curve();
        let baseline = curve.baseline(500.0);
        assert_eq!(baseline, 300.0);
        for i in 0..=10 {
            assert_eq!(curve.sample_y(i as f32 / 10.0, 3.7, baseline), baseline);
        }
    }

    #[test]
    fn single_layer_matches_closed_form() {
        let curve = FlowCurve {
            amplitude: 10.0,
            wave_count: 1,
            ..flat_curve()
        };
        let (t, time) = (0.25_f32, 2.0_f32);
        let drift = time * curve.speed;
        let expected = (t * TAU * curve.frequency * WAVE_FREQUENCY_SCALE + drift).sin() * 10.0
            + (0.6 * PI * t + drift * 0.4).sin() * 3.5
            + (1.3 * PI * t + drift * 0.6).cos() * 2.5
            + (2.7 * PI * t + drift * 0.8).sin() * 1.5;
        assert!((curve.sample_y(t, time, 0.0) - expected).abs() < 1e-4);
    }

    #[test]
    fn random_curves_respect_ranges() {
        let settings = FlowSettings::default();
        let mut rng = StdRng::seed_from_u64(42);
        for index in 0..settings.curve_count {
            let curve = FlowCurve::random(&mut rng, &settings, index, settings.curve_count);
            assert!(settings.amplitude.contains(curve.amplitude));
            assert!(settings.hue.contains(curve.hue));
            assert!((4..=5).contains(&curve.wave_count));
            assert!(curve.baseline_offset.abs() <= 0.5 * settings.baseline_spread + 0.02);
        }
    }
}
