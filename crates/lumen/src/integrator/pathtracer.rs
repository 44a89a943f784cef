use crate::{color::Color, ray::Ray, sampler::Sampler, scene::Scene};

use super::Integrator;

/// Iterative path tracing with optional next-event estimation.
///
/// Shadow rays go through [Scene::transmittance], which composes opaque
/// occluders, stochastic alpha masks and volumetric attenuation in one call
/// and applies each shape's own self-intersection policy, so no epsilon
/// offsets are needed at either endpoint.
pub struct PathTracer {
    max_depth: u32,
    nee: bool,
}

impl PathTracer {
    pub fn new(max_depth: u32, nee: bool) -> Self {
        Self {
            max_depth: max_depth.max(1),
            nee,
        }
    }
}

impl Default for PathTracer {
    fn default() -> Self {
        Self::new(2, true)
    }
}

impl Integrator for PathTracer {
    fn li(&self, scene: &Scene, primary: Ray, rng: &mut dyn Sampler) -> Color {
        let use_nee = self.nee && scene.has_lights();

        let mut radiance = Color::BLACK;
        let mut throughput = Color::WHITE;
        let mut ray = primary;

        for bounce in 0.. {
            let its = scene.intersect(&ray, rng);

            if !its.is_hit() {
                radiance += throughput * scene.evaluate_background(ray.direction);
                break;
            }

            radiance += throughput * scene.evaluate_emission(&its);

            if bounce >= self.max_depth - 1 {
                break;
            }

            if use_nee {
                if let Some(selected) = scene.sample_light(rng) {
                    if let Some(light_sample) =
                        selected.light.sample_direct(its.position, rng)
                    {
                        let shadow = Ray::with_unit_direction(its.position, light_sample.wi);
                        let transmittance =
                            scene.transmittance(&shadow, light_sample.distance, rng);
                        if transmittance > 0.0 {
                            let bsdf = its.evaluate_bsdf(light_sample.wi);
                            if !bsdf.is_invalid() {
                                radiance += throughput
                                    * bsdf.value
                                    * light_sample.weight
                                    * transmittance
                                    / selected.probability;
                            }
                        }
                    }
                }
            }

            let Some(bounce_sample) = its.sample_bsdf(rng) else {
                break;
            };
            throughput *= bounce_sample.weight;
            ray = Ray::with_unit_direction(its.position, bounce_sample.wi);
        }

        radiance
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bsdf::Diffuse;
    use crate::camera::{Camera, FovAxis, Perspective};
    use crate::emission;
    use crate::instance::Instance;
    use crate::light::{EnvironmentMap, Light, PointLight};
    use crate::math::{point::Point, transform::Transform};
    use crate::sampler::IndependentSampler;
    use crate::shape::{Sphere, Volume};
    use crate::texture::ConstantTexture;
    use glam::{UVec2, Vec3};

    fn test_camera() -> Arc<dyn Camera> {
        Arc::new(Perspective::new(
            UVec2::new(16, 16),
            Transform::IDENTITY,
            70.0,
            FovAxis::Y,
        ))
    }

    fn white_envmap() -> Arc<EnvironmentMap> {
        Arc::new(EnvironmentMap::new(
            Arc::new(ConstantTexture::new(Color::WHITE)),
            None,
        ))
    }

    #[test]
    fn depth_one_only_sees_emission() {
        let emitter = Instance::new(Arc::new(Sphere))
            .with_transform(Transform::translation(Vec3::Z * 3.0))
            .with_emission(Arc::new(emission::Lambertian::new(Arc::new(
                ConstantTexture::new(Color::splat(7.0)),
            ))));
        let lights: Vec<Arc<dyn Light>> = vec![Arc::new(PointLight::new(
            Point::new(0.0, 5.0, 0.0),
            Color::splat(100.0),
        ))];
        let scene = Scene::new(vec![emitter], lights, None, test_camera());

        let mut rng = IndependentSampler::new(0);
        let tracer = PathTracer::new(1, true);
        let estimate = tracer.li(&scene, Ray::new(Point::ORIGIN, Vec3::Z), &mut rng);
        assert!((estimate.mean() - 7.0).abs() < 1e-5);
    }

    #[test]
    fn white_furnace_converges_to_the_background() {
        // a perfectly white diffuse sphere inside a unit environment: every
        // path eventually escapes carrying weight 1, so deep traces approach
        // radiance 1 from below
        let sphere = Instance::new(Arc::new(Sphere)).with_bsdf(Arc::new(Diffuse::new(
            Arc::new(ConstantTexture::new(Color::WHITE)),
        )));
        let scene = Scene::new(vec![sphere], Vec::new(), Some(white_envmap()), test_camera());

        let tracer = PathTracer::new(16, false);
        let n = 2000;
        let mut sum = 0.0;
        for i in 0..n {
            let mut rng = IndependentSampler::for_pixel_sample(0, 0, 0, i);
            let ray = Ray::new(Point::new(0.0, 0.0, -3.0), Vec3::Z);
            sum += tracer.li(&scene, ray, &mut rng).mean();
        }
        let mean = sum / n as f32;
        assert!(mean > 0.93 && mean <= 1.001, "furnace mean {mean}");
    }

    #[test]
    fn volume_under_uniform_sky_attenuates_by_one_minus_transmittance() {
        // scattering events keep weight 1 (albedo 1, isotropic-ish), so the
        // expected radiance through the slab is exactly the sky radiance
        let fog = Instance::new(Arc::new(Volume::new(1.0, Some(Arc::new(Sphere)))))
            .with_bsdf(Arc::new(crate::bsdf::HenyeyGreenstein::new(
                0.0,
                Color::WHITE,
            )));
        let scene = Scene::new(vec![fog], Vec::new(), Some(white_envmap()), test_camera());

        let tracer = PathTracer::new(64, false);
        let n = 3000;
        let mut sum = 0.0;
        for i in 0..n {
            let mut rng = IndependentSampler::for_pixel_sample(3, 1, 2, i);
            let ray = Ray::new(Point::new(0.0, 0.0, -4.0), Vec3::Z);
            sum += tracer.li(&scene, ray, &mut rng).mean();
        }
        let mean = sum / n as f32;
        assert!((mean - 1.0).abs() < 0.05, "fog furnace mean {mean}");
    }

    #[test]
    fn deterministic_for_fixed_seeds() {
        let sphere = Instance::new(Arc::new(Sphere)).with_bsdf(Arc::new(Diffuse::new(
            Arc::new(ConstantTexture::new(Color::new(0.8, 0.5, 0.3))),
        )));
        let lights: Vec<Arc<dyn Light>> = vec![Arc::new(PointLight::new(
            Point::new(3.0, 3.0, -3.0),
            Color::splat(50.0),
        ))];
        let scene = Scene::new(vec![sphere], lights, Some(white_envmap()), test_camera());
        let tracer = PathTracer::new(4, true);

        let render = || -> Vec<Color> {
            let mut pixels = Vec::new();
            for y in 0..4 {
                for x in 0..4 {
                    let mut rng = IndependentSampler::for_pixel_sample(9, x, y, 0);
                    let direction = Vec3::new(
                        (x as f32 - 1.5) * 0.2,
                        (y as f32 - 1.5) * 0.2,
                        -1.0,
                    );
                    let ray = Ray::new(Point::new(0.0, 0.0, 3.0), direction);
                    pixels.push(tracer.li(&scene, ray, &mut rng));
                }
            }
            pixels
        };

        let first = render();
        let second = render();
        assert_eq!(first, second);
        assert!(first.iter().all(|c| c.is_finite()));
        assert!(first.iter().any(|c| !c.is_black()));
    }

    #[test]
    fn nee_reduces_variance_against_point_lights() {
        // with NEE off, a point light is unreachable by BSDF sampling and
        // the image stays black; with NEE on it is found immediately
        let sphere = Instance::new(Arc::new(Sphere)).with_bsdf(Arc::new(Diffuse::new(
            Arc::new(ConstantTexture::new(Color::WHITE)),
        )));
        let lights: Vec<Arc<dyn Light>> = vec![Arc::new(PointLight::new(
            Point::new(0.0, 4.0, -4.0),
            Color::splat(200.0),
        ))];
        let scene = Scene::new(vec![sphere], lights, None, test_camera());
        let ray = Ray::new(Point::new(0.0, 0.0, -3.0), Vec3::Z);

        let mut rng = IndependentSampler::new(5);
        let with_nee = PathTracer::new(3, true).li(&scene, ray, &mut rng);
        assert!(!with_nee.is_black());

        let mut rng = IndependentSampler::new(5);
        let without = PathTracer::new(3, false).li(&scene, ray, &mut rng);
        assert!(without.is_black());
    }
}
