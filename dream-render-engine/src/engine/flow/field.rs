use bevy::math::Vec2;
use constants::flow::BEZIER_SUBDIVISIONS;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::curve::FlowCurve;
use super::spline::{flatten_into, flattened_len};
use crate::engine::core::config::FlowSettings;
use crate::engine::core::error::ViewportError;

/// Per-curve sample and flattened path storage for one viewport size.
#[derive(Debug, Clone, PartialEq)]
struct PointSet {
    width: f32,
    height: f32,
    samples: Vec<Vec<Vec2>>,
    paths: Vec<Vec<Vec2>>,
}

impl PointSet {
    fn allocate(curves: usize, segments: usize, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            samples: vec![vec![Vec2::ZERO; segments + 1]; curves],
            paths: vec![vec![Vec2::ZERO; flattened_len(segments + 1, BEZIER_SUBDIVISIONS)]; curves],
        }
    }

    /// Rewrite every sample and path in place for clock `time`.
    fn evaluate(&mut self, curves: &[FlowCurve], time: f32) {
        for (c, curve) in curves.iter().enumerate() {
            let samples = &mut self.samples[c];
            let last = (samples.len() - 1).max(1) as f32;
            let baseline = curve.baseline(self.height);
            for (s, sample) in samples.iter_mut().enumerate() {
                let t = s as f32 / last;
                *sample = Vec2::new(t * self.width, curve.sample_y(t, time, baseline));
            }
            flatten_into(&self.samples[c], BEZIER_SUBDIVISIONS, &mut self.paths[c]);
        }
    }

    fn first_non_finite(&self) -> Option<usize> {
        self.paths
            .iter()
            .position(|path| path.iter().any(|p| !p.is_finite()))
    }
}

/// All flow curves plus their per-frame points.
///
/// Buffers are allocated at construction and on resize only; [`advance`]
/// rewrites them in place.
///
/// [`advance`]: FlowField::advance
#[derive(Debug, Clone)]
pub struct FlowField {
    curves: Vec<FlowCurve>,
    points: PointSet,
    segments: usize,
    time: f32,
    dirty: bool,
}

impl FlowField {
    pub fn new(settings: &FlowSettings, width: f32, height: f32) -> Result<Self, ViewportError> {
        check_viewport(width, height)?;
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let count = settings.curve_count;
        let curves: Vec<FlowCurve> = (0..count)
            .map(|index| FlowCurve::random(&mut rng, settings, index, count))
            .collect();
        Self::from_curves(curves, settings.segments, width, height)
    }

    pub fn from_curves(
        curves: Vec<FlowCurve>,
        segments: usize,
        width: f32,
        height: f32,
    ) -> Result<Self, ViewportError> {
        check_viewport(width, height)?;
        let segments = segments.max(1);
        let mut points = PointSet::allocate(curves.len(), segments, width, height);
        points.evaluate(&curves, 0.0);
        if let Some(curve) = points.first_non_finite() {
            return Err(ViewportError::NonFinite(curve));
        }
        Ok(Self {
            curves,
            points,
            segments,
            time: 0.0,
            dirty: true,
        })
    }

    pub fn curves(&self) -> &[FlowCurve] {
        &self.curves
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.points.width, self.points.height)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Raw samples of curve `index`, `segments + 1` points.
    pub fn samples(&self, index: usize) -> &[Vec2] {
        &self.points.samples[index]
    }

    /// Smoothed, flattened path of curve `index`.
    pub fn path(&self, index: usize) -> &[Vec2] {
        &self.points.paths[index]
    }

    pub fn path_len(&self) -> usize {
        flattened_len(self.segments + 1, BEZIER_SUBDIVISIONS)
    }

    /// Recompute every curve for clock `time` seconds.
    pub fn advance(&mut self, time: f32) {
        if !time.is_finite() {
            return;
        }
        self.time = time;
        self.points.evaluate(&self.curves, time);
        self.dirty = true;
    }

    /// Regenerate all sample points for a new viewport.
    ///
    /// The replacement set is built and validated before it is swapped in;
    /// on error the previous set stays untouched.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ViewportError> {
        check_viewport(width, height)?;
        let mut next = PointSet::allocate(self.curves.len(), self.segments, width, height);
        next.evaluate(&self.curves, self.time);
        if let Some(curve) = next.first_non_finite() {
            return Err(ViewportError::NonFinite(curve));
        }
        self.points = next;
        self.dirty = true;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

fn check_viewport(width: f32, height: f32) -> Result<(), ViewportError> {
    let usable = |v: f32| v.is_finite() && v >= 1.0;
    if usable(width) && usable(height) {
        Ok(())
    } else {
        Err(ViewportError::Degenerate { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FlowSettings {
        FlowSettings {
            curve_count: 3,
            segments: 20,
            seed: Some(17),
            ..FlowSettings::default()
        }
    }

    #[test]
    fn samples_span_viewport_width() {
        let field = FlowField::new(&settings(), 800.0, 600.0).unwrap();
        for c in 0..3 {
            let samples = field.samples(c);
            assert_eq!(samples.len(), 21);
            assert_eq!(samples[0].x, 0.0);
            assert_eq!(samples[20].x, 800.0);
            assert_eq!(field.path(c).len(), field.path_len());
        }
    }

    #[test]
    fn advance_matches_curve_formula() {
        let mut field = FlowField::new(&settings(), 800.0, 600.0).unwrap();
        field.advance(4.2);
        let curve = field.curves()[1];
        let baseline = curve.baseline(600.0);
        let expected = curve.sample_y(0.5, 4.2, baseline);
        assert!((field.samples(1)[10].y - expected).abs() < 1e-4);
    }

    #[test]
    fn resize_regenerates_every_curve() {
        let mut field = FlowField::new(&settings(), 800.0, 600.0).unwrap();
        field.take_dirty();
        field.resize(1200.0, 400.0).unwrap();
        assert!(field.is_dirty());
        assert_eq!(field.viewport(), Vec2::new(1200.0, 400.0));
        assert_eq!(field.samples(2)[20].x, 1200.0);
    }

    #[test]
    fn degenerate_resize_keeps_previous_points() {
        let mut field = FlowField::new(&settings(), 800.0, 600.0).unwrap();
        field.advance(1.0);
        let before: Vec<Vec2> = field.path(0).to_vec();

        assert_eq!(
            field.resize(0.0, 600.0),
            Err(ViewportError::Degenerate {
                width: 0.0,
                height: 600.0
            })
        );
        assert!(field.resize(f32::NAN, 10.0).is_err());
        assert_eq!(field.path(0), before.as_slice());
        assert_eq!(field.viewport(), Vec2::new(800.0, 600.0));
    }

    #[test]
    fn non_finite_curve_is_rejected() {
        let mut curves = vec![FlowCurve::random(
            &mut StdRng::seed_from_u64(1),
            &settings(),
            0,
            1,
        )];
        curves[0].amplitude = f32::INFINITY;
        assert_eq!(
            FlowField::from_curves(curves, 10, 100.0, 100.0).err(),
            Some(ViewportError::NonFinite(0))
        );
    }
}
