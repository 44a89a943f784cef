//! GGX (Trowbridge–Reitz) microfacet helpers shared by the rough conductor
//! and the metallic lobe of the principled BSDF. Everything operates in
//! local shading coordinates.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::math::distributions::square_to_uniform_disk;

/// The GGX normal distribution D(h) for roughness `alpha`.
pub fn evaluate_ggx(alpha: f32, h: Vec3) -> f32 {
    let cos2 = h.z * h.z;
    let a2 = alpha * alpha;
    let d = cos2 * (a2 - 1.0) + 1.0;
    a2 / (PI * d * d)
}

/// Smith's separable shadowing-masking term G₁ for one direction. Zero when
/// `w` is on the wrong side of the microfacet.
pub fn smith_g1(alpha: f32, h: Vec3, w: Vec3) -> f32 {
    if w.dot(h) * w.z <= 0.0 {
        return 0.0;
    }
    let cos2 = (w.z * w.z).min(1.0);
    if cos2 <= 0.0 {
        return 0.0;
    }
    let tan2 = (1.0 - cos2) / cos2;
    2.0 / (1.0 + (1.0 + alpha * alpha * tan2).sqrt())
}

/// Sample a visible microfacet normal for outgoing direction `wo` (Heitz's
/// VNDF construction). `wo` must be in the upper hemisphere.
pub fn sample_ggx_vndf(alpha: f32, wo: Vec3, u: Vec2) -> Vec3 {
    // stretch the view vector into the hemisphere configuration
    let wh = Vec3::new(alpha * wo.x, alpha * wo.y, wo.z).normalize();
    let wh = if wh.z < 0.0 { -wh } else { wh };

    let t1 = if wh.z < 0.999 {
        Vec3::Z.cross(wh).normalize()
    } else {
        Vec3::X
    };
    let t2 = wh.cross(t1);

    let p = square_to_uniform_disk(u);
    let h = (1.0 - p.x * p.x).max(0.0).sqrt();
    let lerp = (1.0 + wh.z) / 2.0;
    let py = lerp * p.y + (1.0 - lerp) * h;

    let pz = (1.0 - p.x * p.x - py * py).max(0.0).sqrt();
    let nh = p.x * t1 + py * t2 + pz * wh;

    // unstretch; the sampled normal picks up alpha, not 1/alpha
    Vec3::new(alpha * nh.x, alpha * nh.y, nh.z.max(1e-6)).normalize()
}

/// Mirror `w` about the microfacet normal `n`; both sides point away from
/// the surface.
pub fn reflect(w: Vec3, n: Vec3) -> Vec3 {
    2.0 * w.dot(n) * n - w
}

/// Schlick's approximation of the Fresnel factor with normal-incidence
/// reflectance `f0`.
pub fn schlick(f0: f32, cos_theta: f32) -> f32 {
    let m = (1.0 - cos_theta).clamp(0.0, 1.0);
    f0 + (1.0 - f0) * m.powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{IndependentSampler, Sampler};

    #[test]
    fn ggx_integrates_to_one_over_projected_area() {
        // ∫ D(h) cosθ dω = 1; check by uniform hemisphere Monte Carlo
        let alpha = 0.3;
        let mut rng = IndependentSampler::new(9);
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = rng.next2d();
            let z = u.x;
            let r = (1.0f32 - z * z).max(0.0).sqrt();
            let (s, c) = f32::sin_cos(std::f32::consts::TAU * u.y);
            let h = glam::Vec3::new(r * c, r * s, z);
            // pdf of uniform hemisphere is 1/2π
            sum += evaluate_ggx(alpha, h) * z * 2.0 * std::f32::consts::PI;
        }
        let estimate = sum / n as f32;
        assert!((estimate - 1.0).abs() < 0.05, "estimate {estimate}");
    }

    #[test]
    fn vndf_samples_are_upper_hemisphere_unit_normals() {
        let mut rng = IndependentSampler::new(4);
        for &alpha in &[1e-3, 0.1, 0.5, 1.0] {
            for _ in 0..500 {
                let wo = crate::math::distributions::square_to_cosine_hemisphere(rng.next2d());
                let h = sample_ggx_vndf(alpha, wo, rng.next2d());
                assert!((h.length() - 1.0).abs() < 1e-4);
                assert!(h.z > 0.0);
            }
        }
    }

    #[test]
    fn reflect_preserves_angles() {
        let n = glam::Vec3::Z;
        let w = glam::Vec3::new(0.6, 0.0, 0.8);
        let r = reflect(w, n);
        assert!((r - glam::Vec3::new(-0.6, 0.0, 0.8)).length() < 1e-6);
        assert!((w.dot(n) - r.dot(n)).abs() < 1e-6);
    }

    #[test]
    fn schlick_endpoints() {
        assert!((schlick(0.04, 1.0) - 0.04).abs() < 1e-6);
        assert!((schlick(0.04, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn g1_vanishes_below_the_facet() {
        let h = glam::Vec3::Z;
        assert_eq!(smith_g1(0.2, h, glam::Vec3::new(0.0, 0.0, -1.0)), 0.0);
        let g = smith_g1(0.2, h, glam::Vec3::new(0.1, 0.0, 0.99).normalize());
        assert!(g > 0.9 && g <= 1.0);
    }
}
