use std::f32::consts::PI;

use bevy::math::Vec3;
use rand::Rng;

/// `count` points evenly spread over a sphere of `radius` (golden-angle
/// spiral), centred on the origin.
pub fn fibonacci_sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    (0..count)
        .map(|i| {
            let y = if count > 1 {
                1.0 - 2.0 * i as f32 / (count - 1) as f32
            } else {
                0.0
            };
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = golden_angle * i as f32;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring) * radius
        })
        .collect()
}

/// Uniform scatter inside a cube of half extent `extent`.
pub fn scatter_into(rng: &mut impl Rng, extent: f32, out: &mut [Vec3]) {
    let extent = extent.abs().max(f32::EPSILON);
    for position in out {
        *position = Vec3::new(
            rng.gen_range(-extent..=extent),
            rng.gen_range(-extent..=extent),
            rng.gen_range(-extent..=extent),
        );
    }
}
