use bevy::prelude::*;
use constants::{flow, formation, nodes, particles, render_settings};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Path of the engine configuration, relative to the asset root.
pub const ENGINE_CONFIG_PATH: &str = "config/dream.engine.json";

/// Inclusive `[min, max]` range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(ConfigError::NonFinite(field));
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Complete engine configuration. Loaded as a JSON asset; every field falls
/// back to its default when absent.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub particles: ParticleSettings,
    pub connections: ConnectionSettings,
    pub flow: FlowSettings,
    pub formation: FormationSettings,
    pub nodes: NodeSettings,
    pub camera: CameraRigSettings,
    pub render: RenderSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particles: ParticleSettings::default(),
            connections: ConnectionSettings::default(),
            flow: FlowSettings::default(),
            formation: FormationSettings::default(),
            nodes: NodeSettings::default(),
            camera: CameraRigSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite(field));
    }
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite(field));
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

impl EngineConfig {
    /// Reject inverted or non-finite ranges, zero capacities, an empty
    /// palette and field extents the samplers cannot draw from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particles;
        if p.count == 0 {
            return Err(ConfigError::ZeroCapacity("particles.count"));
        }
        if p.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        p.lifespan.check("particles.lifespan")?;
        p.opacity.check("particles.opacity")?;
        for axis in 0..3 {
            ValueRange::new(p.velocity_min[axis], p.velocity_max[axis])
                .check("particles.velocity")?;
        }
        positive("particles.field_width", p.field_width)?;
        positive("particles.field_height", p.field_height)?;
        non_negative("particles.margin", p.margin)?;
        let fade_window = particles::FADE_IN_SECONDS + particles::FADE_OUT_SECONDS;
        if p.lifespan.min < fade_window {
            return Err(ConfigError::LifespanTooShort(p.lifespan.min));
        }

        if self.connections.max_connections == 0 {
            return Err(ConfigError::ZeroCapacity("connections.max_connections"));
        }

        let f = &self.flow;
        if f.segments < 2 {
            return Err(ConfigError::ZeroCapacity("flow.segments"));
        }
        f.amplitude.check("flow.amplitude")?;
        f.frequency.check("flow.frequency")?;
        f.speed.check("flow.speed")?;
        f.thickness.check("flow.thickness")?;
        f.hue.check("flow.hue")?;
        f.saturation.check("flow.saturation")?;
        f.lightness.check("flow.lightness")?;
        if f.wave_layers_min > f.wave_layers_max {
            return Err(ConfigError::InvertedRange {
                field: "flow.wave_layers",
                min: f.wave_layers_min as f32,
                max: f.wave_layers_max as f32,
            });
        }

        if self.formation.count == 0 {
            return Err(ConfigError::ZeroCapacity("formation.count"));
        }
        non_negative("formation.scatter_extent", self.formation.scatter_extent)?;

        let c = &self.camera;
        ValueRange::new(c.polar_min, c.polar_max).check("camera.polar")?;
        ValueRange::new(c.distance_min, c.distance_max).check("camera.distance")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub count: usize,
    /// Particles emitted per second while the pool ramps up; `0` fills instantly.
    pub spawn_rate: f32,
    pub lifespan: ValueRange,
    pub velocity_min: [f32; 3],
    pub velocity_max: [f32; 3],
    pub base_size: f32,
    pub accent_size: f32,
    /// Fraction of particles drawn with the accent size.
    pub accent_fraction: f32,
    pub opacity: ValueRange,
    /// sRGB colors particles are drawn from.
    pub palette: Vec<[f32; 3]>,
    pub field_width: f32,
    pub field_height: f32,
    pub margin: f32,
    pub seed: Option<u64>,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: particles::AMBIENT_PARTICLE_COUNT,
            spawn_rate: 80.0,
            lifespan: ValueRange::new(8.0, 16.0),
            velocity_min: [-0.15, 0.4, -0.05],
            velocity_max: [0.15, 1.2, 0.05],
            base_size: 3.0,
            accent_size: 7.0,
            accent_fraction: 0.08,
            opacity: ValueRange::new(0.35, 0.9),
            palette: vec![
                [0.70, 0.78, 1.00],
                [0.82, 0.70, 1.00],
                [1.00, 0.86, 0.95],
                [0.62, 0.92, 1.00],
            ],
            field_width: 48.0,
            field_height: 27.0,
            margin: particles::VIEWPORT_MARGIN,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub distance_threshold: f32,
    pub window: usize,
    pub max_connections: usize,
    pub line_opacity: f32,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            distance_threshold: 3.2,
            window: particles::CONNECTION_WINDOW,
            max_connections: particles::MAX_CONNECTIONS,
            line_opacity: 0.18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    pub curve_count: usize,
    pub segments: usize,
    /// Amplitude in pixels.
    pub amplitude: ValueRange,
    /// Cycles across the viewport width.
    pub frequency: ValueRange,
    pub speed: ValueRange,
    /// Core stroke thickness in pixels.
    pub thickness: ValueRange,
    /// Hue in degrees.
    pub hue: ValueRange,
    pub saturation: ValueRange,
    pub lightness: ValueRange,
    pub wave_layers_min: u32,
    pub wave_layers_max: u32,
    /// Fraction of the viewport height the baselines spread over.
    pub baseline_spread: f32,
    pub seed: Option<u64>,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            curve_count: flow::CURVE_COUNT,
            segments: flow::CURVE_SEGMENTS,
            amplitude: ValueRange::new(18.0, 60.0),
            frequency: ValueRange::new(0.4, 1.1),
            speed: ValueRange::new(0.15, 0.45),
            thickness: ValueRange::new(1.0, 2.4),
            hue: ValueRange::new(200.0, 290.0),
            saturation: ValueRange::new(0.55, 0.85),
            lightness: ValueRange::new(0.45, 0.62),
            wave_layers_min: 4,
            wave_layers_max: 5,
            baseline_spread: 0.7,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationSettings {
    pub count: usize,
    pub convergence_rate: f32,
    pub rotation_speed: f32,
    pub fallback_ceiling: f32,
    pub scatter_extent: f32,
    pub target_radius: f32,
    pub point_size: f32,
    pub opacity: f32,
    /// World-space center of the formation.
    pub origin: [f32; 3],
    pub seed: Option<u64>,
}

impl Default for FormationSettings {
    fn default() -> Self {
        Self {
            count: particles::FORMATION_PARTICLE_COUNT,
            convergence_rate: formation::CONVERGENCE_RATE,
            rotation_speed: formation::FORMED_ROTATION_SPEED,
            fallback_ceiling: formation::FALLBACK_CEILING_SECONDS,
            scatter_extent: formation::SCATTER_EXTENT,
            target_radius: formation::TARGET_RADIUS,
            point_size: 2.2,
            opacity: 0.85,
            origin: [0.0, 6.0, -4.0],
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub rising_particles: usize,
    /// Rising particle climb speed in units per second.
    pub rising_speed: f32,
    pub platform_radius: f32,
    pub billboard_size: f32,
    pub light_intensity: f32,
    pub light_range: f32,
    /// Radius used for cursor picking.
    pub pick_radius: f32,
    /// Mirror hover/select interaction into the node store when no external
    /// data layer is attached.
    pub local_echo: bool,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            rising_particles: nodes::RISING_PARTICLES_PER_NODE,
            rising_speed: 0.6,
            platform_radius: 1.2,
            billboard_size: 1.6,
            light_intensity: 60_000.0,
            light_range: 6.0,
            pick_radius: 1.4,
            local_echo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRigSettings {
    pub orbit_enabled: bool,
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub orbit_center: [f32; 3],
    /// Offset from a selected node to the camera target.
    pub focus_offset: [f32; 3],
    /// Fraction of the remaining distance covered per second.
    pub follow_rate: f32,
    /// Polar angle limits measured from +Y, radians.
    pub polar_min: f32,
    pub polar_max: f32,
    pub distance_min: f32,
    pub distance_max: f32,
    pub drag_sensitivity: f32,
    pub zoom_sensitivity: f32,
}

impl Default for CameraRigSettings {
    fn default() -> Self {
        Self {
            orbit_enabled: true,
            orbit_radius: 22.0,
            orbit_height: 9.0,
            angular_speed: 0.08,
            orbit_center: [0.0, 2.0, 0.0],
            focus_offset: [0.0, 2.5, 7.0],
            follow_rate: 2.5,
            polar_min: 0.35,
            polar_max: 1.45,
            distance_min: 4.0,
            distance_max: 40.0,
            drag_sensitivity: 0.005,
            zoom_sensitivity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub focal_constant: f32,
    pub breathe_depth: f32,
    pub breathe_rate: f32,
    /// sRGB clear color behind the flow curves.
    pub background: [f32; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            focal_constant: render_settings::POINT_FOCAL_CONSTANT,
            breathe_depth: render_settings::BREATHE_DEPTH,
            breathe_rate: render_settings::BREATHE_RATE,
            background: [0.02, 0.02, 0.06],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "particles": { "count": 120 } }"#).unwrap();
        assert_eq!(config.particles.count, 120);
        assert_eq!(config.flow, FlowSettings::default());
        assert_eq!(
            config.particles.palette,
            ParticleSettings::default().palette
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut config = EngineConfig::default();
        config.flow.amplitude = ValueRange::new(50.0, 10.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                field: "flow.amplitude",
                ..
            })
        ));
    }

    #[test]
    fn empty_palette_and_zero_capacity_are_rejected() {
        let mut config = EngineConfig::default();
        config.particles.palette.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));

        let mut config = EngineConfig::default();
        config.connections.max_connections = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity("connections.max_connections"))
        );
    }

    #[test]
    fn lifespan_must_cover_fade_window() {
        let mut config = EngineConfig::default();
        config.particles.lifespan = ValueRange::new(2.0, 6.0);
        assert_eq!(config.validate(), Err(ConfigError::LifespanTooShort(2.0)));
    }

    #[test]
    fn negative_margin_is_rejected() {
        let mut config = EngineConfig::default();
        config.particles.margin = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "particles.margin",
                value: -1.0
            })
        );

        config.particles.margin = f32::NAN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite("particles.margin"))
        );
    }

    #[test]
    fn field_extent_must_be_positive() {
        let mut config = EngineConfig::default();
        config.particles.field_width = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "particles.field_width",
                value: 0.0
            })
        );

        let mut config = EngineConfig::default();
        config.particles.field_height = -27.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "particles.field_height",
                value: -27.0
            })
        );

        let mut config = EngineConfig::default();
        config.particles.field_height = f32::INFINITY;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite("particles.field_height"))
        );
    }

    #[test]
    fn negative_scatter_extent_is_rejected() {
        let mut config = EngineConfig::default();
        config.formation.scatter_extent = -4.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "formation.scatter_extent",
                value: -4.0
            })
        );
    }

    #[test]
    fn non_finite_range_is_rejected() {
        let mut config = EngineConfig::default();
        config.particles.lifespan = ValueRange::new(f32::NAN, 16.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite("particles.lifespan"))
        );
    }

    #[test]
    fn rejected_config_never_reaches_the_pool() {
        let json = r#"{ "particles": { "margin": -1.0 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(
            crate::engine::core::engine::DreamEngine::new(config),
            Err(crate::engine::core::error::EngineError::Config(
                ConfigError::Negative { .. }
            ))
        ));
    }
}
