use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{math::frame::Frame, sampler::Sampler, texture::Texture};

use super::{Bsdf, BsdfEval, BsdfSample};

/// Smooth glass: perfect specular reflection and refraction, importance
/// sampled by the unpolarized Fresnel reflectance.
///
/// `ior` is the ratio inside/outside. The η² factor on the refraction weight
/// accounts for solid-angle compression when transporting radiance; drop it
/// when transporting radiometric power instead.
pub struct Dielectric {
    ior: Arc<dyn Texture>,
    reflectance: Arc<dyn Texture>,
    transmittance: Arc<dyn Texture>,
}

impl Dielectric {
    pub fn new(
        ior: Arc<dyn Texture>,
        reflectance: Arc<dyn Texture>,
        transmittance: Arc<dyn Texture>,
    ) -> Self {
        Self {
            ior,
            reflectance,
            transmittance,
        }
    }
}

impl Bsdf for Dielectric {
    fn evaluate(&self, _uv: Vec2, _wo: Vec3, _wi: Vec3) -> BsdfEval {
        // a delta BSDF: the probability of a light sample hitting exactly
        // the mirror or refraction direction is zero
        BsdfEval::invalid()
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> Option<BsdfSample> {
        let eta = self.ior.scalar(uv);

        let cos_o = Frame::cos_theta(wo);
        let entering = cos_o > 0.0;
        let eta_ratio = if entering { 1.0 / eta } else { eta };

        let abs_cos_o = cos_o.abs();
        let sin2_i = eta_ratio * eta_ratio * (1.0 - cos_o * cos_o);

        // total internal reflection
        if sin2_i >= 1.0 {
            return Some(BsdfSample {
                wi: Vec3::new(-wo.x, -wo.y, wo.z),
                weight: self.reflectance.evaluate(uv),
            });
        }

        let cos_i = (1.0 - sin2_i).sqrt();

        // unpolarized Fresnel from the s and p amplitudes
        let r_s = (eta_ratio * abs_cos_o - cos_i) / (eta_ratio * abs_cos_o + cos_i);
        let r_p = (abs_cos_o - eta_ratio * cos_i) / (abs_cos_o + eta_ratio * cos_i);
        let fresnel = 0.5 * (r_s * r_s + r_p * r_p);

        if rng.next() < fresnel {
            // the cosine in the weight cancels against the pdf
            Some(BsdfSample {
                wi: Vec3::new(-wo.x, -wo.y, wo.z),
                weight: self.reflectance.evaluate(uv),
            })
        } else {
            let sign = if entering { 1.0 } else { -1.0 };
            let wi = Vec3::new(-eta_ratio * wo.x, -eta_ratio * wo.y, -sign * cos_i);
            let eta2 = eta_ratio * eta_ratio;
            Some(BsdfSample {
                wi: wi.normalize(),
                weight: self.transmittance.evaluate(uv) * eta2,
            })
        }
    }
}
