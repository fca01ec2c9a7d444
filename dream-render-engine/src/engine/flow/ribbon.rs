use bevy::math::Vec2;

/// Vertices in a triangle-strip ribbon over `path_len` points.
pub const fn ribbon_vertex_count(path_len: usize) -> usize {
    path_len * 2
}

/// Map a viewport pixel (top-left origin, +Y down) to 2D world space
/// (centre origin, +Y up).
#[inline]
pub fn viewport_to_world(point: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(point.x - viewport.x * 0.5, viewport.y * 0.5 - point.y)
}

/// Expand `path` into a triangle strip of constant `width`, written in place
/// into `out` as alternating left/right vertices.
pub fn write_ribbon(path: &[Vec2], width: f32, viewport: Vec2, out: &mut [[f32; 3]]) {
    let half = width * 0.5;
    let last = path.len().saturating_sub(1);
    for (i, point) in path.iter().enumerate() {
        let tangent = path[(i + 1).min(last)] - path[i.saturating_sub(1)];
        let normal = tangent.perp().try_normalize().unwrap_or(Vec2::Y);
        let centre = viewport_to_world(*point, viewport);
        // Pixel space is +Y down, so the normal flips with the mapping.
        let offset = Vec2::new(normal.x, -normal.y) * half;
        let left = centre + offset;
        let right = centre - offset;
        out[i * 2] = [left.x, left.y, 0.0];
        out[i * 2 + 1] = [right.x, right.y, 0.0];
    }
}
