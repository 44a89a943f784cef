use std::f32::consts::FRAC_1_PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{
    color::Color,
    math::{distributions::square_to_cosine_hemisphere, frame::Frame},
    sampler::Sampler,
    texture::Texture,
};

use super::{
    microfacet::{evaluate_ggx, reflect, sample_ggx_vndf, schlick, smith_g1},
    Bsdf, BsdfEval, BsdfSample,
};

struct DiffuseLobe {
    color: Color,
}

impl DiffuseLobe {
    fn evaluate(&self, wo: Vec3, wi: Vec3) -> BsdfEval {
        if !Frame::same_hemisphere(wo, wi) {
            return BsdfEval::invalid();
        }
        BsdfEval {
            value: self.color * (Frame::abs_cos_theta(wi) * FRAC_1_PI),
        }
    }

    fn sample(&self, wo: Vec3, rng: &mut dyn Sampler) -> BsdfSample {
        let mut wi = square_to_cosine_hemisphere(rng.next2d());
        if Frame::cos_theta(wo) < 0.0 {
            wi.z = -wi.z;
        }
        BsdfSample {
            wi: wi.normalize(),
            weight: self.color,
        }
    }
}

struct MetallicLobe {
    alpha: f32,
    color: Color,
}

impl MetallicLobe {
    fn evaluate(&self, wo: Vec3, wi: Vec3) -> BsdfEval {
        let cos_i = Frame::cos_theta(wi);
        let cos_o = Frame::cos_theta(wo);
        if cos_i <= 1e-4 || cos_o <= 1e-4 {
            return BsdfEval::invalid();
        }

        let h = (wi + wo).normalize();
        if Frame::cos_theta(h) <= 0.0 {
            return BsdfEval::invalid();
        }

        let d = evaluate_ggx(self.alpha, h);
        let g = smith_g1(self.alpha, h, wo) * smith_g1(self.alpha, h, wi);
        BsdfEval {
            value: self.color * (d * g / (4.0 * cos_o)),
        }
    }

    fn sample(&self, wo: Vec3, rng: &mut dyn Sampler) -> Option<BsdfSample> {
        if Frame::cos_theta(wo) <= 1e-6 {
            return None;
        }
        let h = sample_ggx_vndf(self.alpha, wo, rng.next2d());
        let wi = reflect(wo, h);
        Some(BsdfSample {
            wi,
            weight: self.color * smith_g1(self.alpha, h, wi),
        })
    }
}

struct Combination {
    diffuse_probability: f32,
    diffuse: DiffuseLobe,
    metallic: MetallicLobe,
}

/// A two-lobe "principled" material: a diffuse base and a metallic GGX
/// lobe, blended by a Schlick Fresnel factor and the metallic parameter.
/// Lobe selection is proportional to the mean lobe albedos.
pub struct Principled {
    base_color: Arc<dyn Texture>,
    roughness: Arc<dyn Texture>,
    metallic: Arc<dyn Texture>,
    specular: Arc<dyn Texture>,
}

impl Principled {
    pub fn new(
        base_color: Arc<dyn Texture>,
        roughness: Arc<dyn Texture>,
        metallic: Arc<dyn Texture>,
        specular: Arc<dyn Texture>,
    ) -> Self {
        Self {
            base_color,
            roughness,
            metallic,
            specular,
        }
    }

    fn combine(&self, uv: Vec2, wo: Vec3) -> Combination {
        let base_color = self.base_color.evaluate(uv);
        let roughness = self.roughness.scalar(uv);
        let alpha = (roughness * roughness).max(1e-3);
        let specular = self.specular.scalar(uv);
        let metallic = self.metallic.scalar(uv);

        let fresnel = specular * schlick((1.0 - metallic) * 0.08, Frame::cos_theta(wo));

        let diffuse = DiffuseLobe {
            color: (1.0 - fresnel) * (1.0 - metallic) * base_color,
        };
        let metallic = MetallicLobe {
            alpha,
            color: Color::splat(fresnel) + (1.0 - fresnel) * metallic * base_color,
        };

        let diffuse_albedo = diffuse.color.mean();
        let total_albedo = diffuse_albedo + metallic.color.mean();
        Combination {
            diffuse_probability: if total_albedo > 0.0 {
                diffuse_albedo / total_albedo
            } else {
                1.0
            },
            diffuse,
            metallic,
        }
    }
}

impl Bsdf for Principled {
    fn evaluate(&self, uv: Vec2, wo: Vec3, wi: Vec3) -> BsdfEval {
        let combination = self.combine(uv, wo);
        BsdfEval {
            value: combination.diffuse.evaluate(wo, wi).value
                + combination.metallic.evaluate(wo, wi).value,
        }
    }

    fn sample(&self, uv: Vec2, wo: Vec3, rng: &mut dyn Sampler) -> Option<BsdfSample> {
        let combination = self.combine(uv, wo);

        // one-sample estimator: pick a lobe, divide by its selection
        // probability
        let sample = if rng.next() < combination.diffuse_probability {
            let mut sample = combination.diffuse.sample(wo, rng);
            sample.weight = sample.weight / combination.diffuse_probability;
            sample
        } else {
            let mut sample = combination.metallic.sample(wo, rng)?;
            sample.weight = sample.weight / (1.0 - combination.diffuse_probability);
            sample
        };

        if sample.weight.is_black() {
            return None;
        }
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::IndependentSampler;
    use crate::texture::ConstantTexture;

    fn material(metallic: f32, roughness: f32) -> Principled {
        Principled::new(
            Arc::new(ConstantTexture::new(Color::new(0.7, 0.5, 0.3))),
            Arc::new(ConstantTexture::scalar_value(roughness)),
            Arc::new(ConstantTexture::scalar_value(metallic)),
            Arc::new(ConstantTexture::scalar_value(0.5)),
        )
    }

    #[test]
    fn evaluate_sums_both_lobes() {
        let bsdf = material(0.5, 0.6);
        let wo = Vec3::new(0.2, 0.1, 0.95).normalize();
        let wi = Vec3::new(-0.3, 0.2, 0.9).normalize();

        let total = bsdf.evaluate(Vec2::ZERO, wo, wi).value;
        let combination = bsdf.combine(Vec2::ZERO, wo);
        let parts = combination.diffuse.evaluate(wo, wi).value
            + combination.metallic.evaluate(wo, wi).value;
        assert_eq!(total, parts);
        assert!(total.max_component() > 0.0);
    }

    #[test]
    fn fully_metallic_has_no_diffuse_lobe() {
        let bsdf = material(1.0, 0.4);
        let combination = bsdf.combine(Vec2::ZERO, Vec3::Z);
        assert!(combination.diffuse.color.is_black());
        assert!(combination.diffuse_probability < 1e-6);
    }

    #[test]
    fn sampled_weight_accounts_for_lobe_selection() {
        // the one-sample estimator must stay bounded for a rough material
        let bsdf = material(0.3, 0.9);
        let mut rng = IndependentSampler::new(41);
        let wo = Vec3::new(0.1, -0.2, 0.95).normalize();

        let mut sum = Color::BLACK;
        let n = 50_000;
        let mut valid = 0;
        for _ in 0..n {
            if let Some(sample) = bsdf.sample(Vec2::ZERO, wo, &mut rng) {
                assert!(sample.weight.is_finite());
                sum += sample.weight;
                valid += 1;
            }
        }
        assert!(valid > n / 2);
        // the average reflected energy cannot exceed white
        assert!((sum / valid as f32).max_component() <= 1.05);
    }

    #[test]
    fn zero_albedo_defaults_to_the_diffuse_lobe() {
        let bsdf = Principled::new(
            Arc::new(ConstantTexture::new(Color::BLACK)),
            Arc::new(ConstantTexture::scalar_value(1.0)),
            Arc::new(ConstantTexture::scalar_value(1.0)),
            Arc::new(ConstantTexture::scalar_value(0.0)),
        );
        let combination = bsdf.combine(Vec2::ZERO, Vec3::Z);
        assert_eq!(combination.diffuse_probability, 1.0);
        assert!(bsdf
            .sample(Vec2::ZERO, Vec3::Z, &mut IndependentSampler::new(0))
            .is_none());
    }
}
