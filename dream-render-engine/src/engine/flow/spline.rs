use bevy::math::Vec2;

/// Cubic Bézier control points for the segment `p1 → p2` of a Catmull-Rom
/// spline through `p0, p1, p2, p3`.
#[inline]
pub fn catmull_rom_controls(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> (Vec2, Vec2) {
    (p1 + (p2 - p0) / 6.0, p2 - (p3 - p1) / 6.0)
}

#[inline]
pub fn cubic_bezier(p1: Vec2, cp1: Vec2, cp2: Vec2, p2: Vec2, u: f32) -> Vec2 {
    let v = 1.0 - u;
    p1 * (v * v * v) + cp1 * (3.0 * v * v * u) + cp2 * (3.0 * v * u * u) + p2 * (u * u * u)
}

/// Length of the flattened path for `points` samples.
pub fn flattened_len(points: usize, subdivisions: usize) -> usize {
    if points < 2 {
        points
    } else {
        (points - 1) * subdivisions.max(1) + 1
    }
}

/// Flatten the smooth path through `points` into `out`, which must hold
/// [`flattened_len`] entries. Endpoints reuse themselves as the missing
/// neighbour.
pub fn flatten_into(points: &[Vec2], subdivisions: usize, out: &mut [Vec2]) {
    let subdivisions = subdivisions.max(1);
    if points.len() < 2 {
        out.iter_mut().zip(points).for_each(|(o, p)| *o = *p);
        return;
    }

    let last = points.len() - 1;
    let mut cursor = 0;
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];
        let (cp1, cp2) = catmull_rom_controls(p0, p1, p2, p3);
        for step in 0..subdivisions {
            out[cursor] = cubic_bezier(p1, cp1, cp2, p2, step as f32 / subdivisions as f32);
            cursor += 1;
        }
    }
    out[cursor] = points[last];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_points_follow_neighbours() {
        let (cp1, cp2) = catmull_rom_controls(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 3.0),
        );
        assert_eq!(cp1, Vec2::new(1.0 + 2.0 / 6.0, 1.0));
        assert_eq!(cp2, Vec2::new(2.0 - 2.0 / 6.0, 0.0 - 2.0 / 6.0));
    }

    #[test]
    fn path_passes_through_samples() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(20.0, -5.0),
            Vec2::new(30.0, 0.0),
        ];
        let mut out = vec![Vec2::ZERO; flattened_len(points.len(), 3)];
        flatten_into(&points, 3, &mut out);
        assert_eq!(out.len(), 10);
        for (i, point) in points.iter().enumerate() {
            assert!(out[i * 3].distance(*point) < 1e-5);
        }
    }

    #[test]
    fn collinear_samples_stay_on_the_line() {
        let points: Vec<Vec2> = (0..5).map(|i| Vec2::new(i as f32, 2.0 * i as f32)).collect();
        let mut out = vec![Vec2::ZERO; flattened_len(points.len(), 4)];
        flatten_into(&points, 4, &mut out);
        assert!(out.iter().all(|p| (p.y - 2.0 * p.x).abs() < 1e-4));
    }
}
