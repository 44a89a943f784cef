//! Warps from the unit square to the sampling domains used by BSDFs, lights
//! and cameras. All take uniform samples in [0,1)².

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

pub fn square_to_uniform_disk(u: Vec2) -> Vec2 {
    let r = u.x.sqrt();
    let (s, c) = f32::sin_cos(TAU * u.y);
    Vec2::new(r * c, r * s)
}

/// Cosine-weighted hemisphere around +z; pdf is cosθ/π.
pub fn square_to_cosine_hemisphere(u: Vec2) -> Vec3 {
    let p = square_to_uniform_disk(u);
    let z = f32::sqrt(f32::max(0.0, 1.0 - p.length_squared()));
    Vec3::new(p.x, p.y, z)
}

/// Uniform direction on the full sphere; pdf is 1/4π.
pub fn square_to_uniform_sphere(u: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * u.x;
    let r = f32::sqrt(f32::max(0.0, 1.0 - z * z));
    let (s, c) = f32::sin_cos(TAU * u.y);
    Vec3::new(r * c, r * s, z)
}
