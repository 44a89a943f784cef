use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{math::frame::Frame, sampler::Sampler, texture::Texture};

use super::{
    microfacet::{evaluate_ggx, reflect, sample_ggx_vndf, smith_g1},
    Bsdf, BsdfEval, BsdfSample,
};

/// GGX microfacet reflection off a conductor. Roughness is squared into the
/// distribution parameter and floored so the distribution stays well
/// conditioned near mirror smoothness.
pub struct RoughConductor {
    reflectance: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
}

impl RoughConductor {
    pub fn new(reflectance: Arc<dyn Texture>, roughness: Arc<dyn Texture>) -> Self {
        Self {
            reflectance,
            roughness,
        }
    }

    fn alpha(&self, uv: Vec2) -> f32 {
        let roughness = self.roughness.scalar(uv);
        (roughness * roughness).max(1e-3)
    }
}

impl Bsdf for RoughConductor {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let alpha = self.alpha(uv);

        if !Frame::same_hemisphere(wo, wi) {
            return BsdfEval::invalid();
        }
        let cos_o = Frame::abs_cos_theta(wo);
        let cos_i = Frame::abs_cos_theta(wi);
        if cos_o < 1e-4 || cos_i < 1e-4 {
            return BsdfEval::invalid();
        }

        let h = (wo + wi).normalize();
        if Frame::cos_theta(h) <= 0.0 {
            return BsdfEval::invalid();
        }

        let d = evaluate_ggx(alpha, h);
        let g = smith_g1(alpha, h, wo) * smith_g1(alpha, h, wi);

        // f · |cosθi| with the |cosθi| of the numerator already cancelled
        BsdfEval {
            value: self.reflectance.evaluate(uv) * (d * g / (4.0 * cos_o)),
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> Option<BsdfSample> {
        let alpha = self.alpha(uv);
        if Frame::cos_theta(wo) <= 1e-6 {
            return None;
        }

        let h = sample_ggx_vndf(alpha, wo, rng.next2d());
        let wi = reflect(wo, h);

        // VNDF sampling leaves exactly the shadowing of the incoming side
        let weight = self.reflectance.evaluate(uv) * smith_g1(alpha, h, wi);
        if weight.is_black() {
            return None;
        }
        Some(BsdfSample { wi, weight })
    }
}
