use std::f32::consts::FRAC_1_PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{
    math::{distributions::square_to_cosine_hemisphere, frame::Frame},
    sampler::Sampler,
    texture::Texture,
};

use super::{Bsdf, BsdfEval, BsdfSample};

/// Ideal Lambertian reflection.
pub struct Diffuse {
    albedo: Arc<dyn Texture>,
}

impl Diffuse {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }
}

impl Bsdf for Diffuse {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        if !Frame::same_hemisphere(wo, wi) {
            return BsdfEval::invalid();
        }
        BsdfEval {
            value: self.albedo.evaluate(uv) * (Frame::abs_cos_theta(wi) * FRAC_1_PI),
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> Option<BsdfSample> {
        let mut wi = square_to_cosine_hemisphere(rng.next2d());
        if Frame::cos_theta(wo) < 0.0 {
            wi.z = -wi.z;
        }

        let weight = self.albedo.evaluate(uv);
        if weight.is_black() {
            return None;
        }

        // cosine-weighted sampling cancels both the cosine and 1/π
        Some(BsdfSample {
            wi: wi.normalize(),
            weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::math::distributions::square_to_uniform_sphere;
    use crate::sampler::IndependentSampler;
    use crate::texture::ConstantTexture;

    fn diffuse(albedo: Color) -> Diffuse {
        Diffuse::new(Arc::new(ConstantTexture::new(albedo)))
    }

    #[test]
    fn reciprocity() {
        // f(wo, wi) = eval / |cosθi| must be symmetric in its arguments
        let bsdf = diffuse(Color::new(0.8, 0.6, 0.4));
        let mut rng = IndependentSampler::new(2);
        for _ in 0..1000 {
            let wo = square_to_uniform_sphere(rng.next2d());
            let wi = square_to_uniform_sphere(rng.next2d());
            let forward = bsdf.evaluate(Vec2::ZERO, wo, wi);
            let backward = bsdf.evaluate(Vec2::ZERO, wi, wo);

            let f_fwd = forward.value.vec() / Frame::abs_cos_theta(wi).max(1e-8);
            let f_bwd = backward.value.vec() / Frame::abs_cos_theta(wo).max(1e-8);
            assert!((f_fwd - f_bwd).length() < 1e-5);
        }
    }

    #[test]
    fn opposite_hemispheres_evaluate_to_zero() {
        let bsdf = diffuse(Color::WHITE);
        let eval = bsdf.evaluate(
            Vec2::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        );
        assert!(eval.is_invalid());
    }

    #[test]
    fn sampled_energy_is_bounded_by_albedo() {
        let albedo = Color::new(0.7, 0.7, 0.7);
        let bsdf = diffuse(albedo);
        let mut rng = IndependentSampler::new(8);

        let wo = Vec3::new(0.3, -0.2, 0.9).normalize();
        let n = 1_000_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let sample = bsdf.sample(Vec2::ZERO, wo, &mut rng).unwrap();
            assert!(Frame::same_hemisphere(wo, sample.wi));
            sum += sample.weight.mean() as f64;
        }
        let mean = sum / n as f64;
        // cosine sampling is exact here, so the mean weight equals the
        // albedo up to floating point noise
        assert!(mean <= albedo.mean() as f64 + 1e-4);
        assert!((mean - albedo.mean() as f64).abs() < 1e-3);
    }

    #[test]
    fn sampling_below_the_surface_flips_the_lobe() {
        let bsdf = diffuse(Color::WHITE);
        let mut rng = IndependentSampler::new(13);
        let wo = Vec3::new(0.1, 0.1, -1.0).normalize();
        for _ in 0..100 {
            let sample = bsdf.sample(Vec2::ZERO, wo, &mut rng).unwrap();
            assert!(sample.wi.z < 0.0);
        }
    }
}
