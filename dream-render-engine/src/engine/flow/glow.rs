use constants::flow::{GLOW_DEPTH, GLOW_RATE_PER_MS};

/// One stroke of the layered glow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePass {
    pub name: &'static str,
    /// Multiplier on the curve thickness.
    pub width_scale: f32,
    /// Extra ribbon width in pixels standing in for blur radius.
    pub blur: f32,
    pub opacity: f32,
    /// Added to the curve lightness, saturating at 0.95.
    pub lightness_boost: f32,
    /// Whether the slow brightness oscillation applies.
    pub oscillates: bool,
}

/// Drawn back to front.
pub static GLOW_PASSES: [StrokePass; 4] = [
    StrokePass {
        name: "outer_glow",
        width_scale: 6.0,
        blur: 14.0,
        opacity: 0.04,
        lightness_boost: 0.0,
        oscillates: false,
    },
    StrokePass {
        name: "mid_glow",
        width_scale: 3.5,
        blur: 8.0,
        opacity: 0.08,
        lightness_boost: 0.08,
        oscillates: false,
    },
    StrokePass {
        name: "inner_glow",
        width_scale: 2.0,
        blur: 3.0,
        opacity: 0.18,
        lightness_boost: 0.16,
        oscillates: true,
    },
    StrokePass {
        name: "core",
        width_scale: 1.0,
        blur: 0.0,
        opacity: 0.55,
        lightness_boost: 0.28,
        oscillates: true,
    },
];

/// `1 + 0.12 sin(0.0004 t + phase)` with `t` in milliseconds.
#[inline]
pub fn glow_factor(time_ms: f32, phase: f32) -> f32 {
    1.0 + GLOW_DEPTH * (GLOW_RATE_PER_MS * time_ms + phase).sin()
}

impl StrokePass {
    pub fn ribbon_width(&self, thickness: f32) -> f32 {
        thickness * self.width_scale + self.blur
    }

    /// Alpha for this pass at the given clock.
    pub fn alpha(&self, time_ms: f32, phase: f32) -> f32 {
        let glow = if self.oscillates {
            glow_factor(time_ms, phase)
        } else {
            1.0
        };
        (self.opacity * glow).clamp(0.0, 1.0)
    }

    pub fn lightness(&self, base: f32) -> f32 {
        (base + self.lightness_boost).min(0.95)
    }
}
