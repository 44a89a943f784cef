use crate::{color::Color, ray::Ray, sampler::Sampler, scene::Scene};

use super::Integrator;

/// Single-bounce direct illumination: emitted light at the first hit, one
/// next-event-estimation sample toward a light, and one BSDF bounce to pick
/// up emitters and the background.
pub struct DirectIntegrator;

impl Integrator for DirectIntegrator {
    fn li(&self, scene: &Scene, ray: Ray, rng: &mut dyn Sampler) -> Color {
        let its = scene.intersect(&ray, rng);
        if !its.is_hit() {
            return scene.evaluate_background(ray.direction);
        }

        let mut result = scene.evaluate_emission(&its);

        // NEE leg
        if scene.has_lights() {
            if let Some(selected) = scene.sample_light(rng) {
                if let Some(light_sample) = selected.light.sample_direct(its.position, rng) {
                    let shadow = Ray::with_unit_direction(its.position, light_sample.wi);
                    let transmittance =
                        scene.transmittance(&shadow, light_sample.distance, rng);
                    if transmittance > 0.0 {
                        let bsdf = its.evaluate_bsdf(light_sample.wi);
                        if !bsdf.is_invalid() {
                            result += bsdf.value * light_sample.weight * transmittance
                                / selected.probability;
                        }
                    }
                }
            }
        }

        // BSDF leg: one bounce toward emitters and the background
        if let Some(bounce) = its.sample_bsdf(rng) {
            let bounce_ray = Ray::with_unit_direction(its.position, bounce.wi);
            let bounce_its = scene.intersect(&bounce_ray, rng);
            result += bounce.weight * scene.evaluate_emission(&bounce_its);
        }

        result
    }
}
