use std::sync::Arc;

use glam::Vec3;

use crate::{
    accel::Bvh,
    camera::Camera,
    color::Color,
    instance::Instance,
    intersection::Intersection,
    light::{EnvironmentMap, Light, LightSample},
    math::bounds::Bounds,
    ray::Ray,
    sampler::Sampler,
};

/// The fully assembled world: instances, lights, background, camera and the
/// top-level acceleration structure over instance bounds.
///
/// A scene is immutable once built; integrators only ever read it, so it can
/// be shared freely between render threads.
pub struct Scene {
    instances: Vec<Instance>,
    accel: Bvh,
    lights: Vec<Arc<dyn Light>>,
    background: Option<Arc<EnvironmentMap>>,
    camera: Arc<dyn Camera>,
}

impl Scene {
    pub fn new(
        instances: Vec<Instance>,
        lights: Vec<Arc<dyn Light>>,
        background: Option<Arc<EnvironmentMap>>,
        camera: Arc<dyn Camera>,
    ) -> Self {
        let instance_bounds: Vec<Bounds> =
            instances.iter().map(Instance::bounding_box).collect();
        log::info!(
            "building scene with {} instances, {} lights",
            instances.len(),
            lights.len()
        );

        Self {
            accel: Bvh::build(&instance_bounds),
            instances,
            lights,
            background,
            camera,
        }
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    /// Trace `ray` against all instances and return the nearest hit, or a
    /// miss carrying the ray direction for background evaluation.
    pub fn intersect(&self, ray: &Ray, rng: &mut dyn Sampler) -> Intersection<'_> {
        let mut its = Intersection::miss();
        its.wo = -ray.direction;

        let mut stats = std::mem::take(&mut its.stats);
        let instances = &self.instances;
        self.accel
            .traverse(ray, f32::INFINITY, &mut stats, &mut |index, _bound| {
                instances[index as usize].intersect(ray, &mut its, rng);
                its.t
            });
        its.stats = stats;
        its
    }

    /// The fraction of light travelling along `ray` that reaches `t_max`,
    /// composing opaque blockers, stochastic alpha masks and volumetric
    /// attenuation. Shadow rays use this instead of an epsilon-offset
    /// intersection test.
    pub fn transmittance(&self, ray: &Ray, t_max: f32, rng: &mut dyn Sampler) -> f32 {
        let mut transmittance = 1.0;
        for instance in &self.instances {
            transmittance *= instance.transmittance(ray, t_max, rng);
            if transmittance == 0.0 {
                return 0.0;
            }
        }
        transmittance
    }

    pub fn has_lights(&self) -> bool {
        !self.lights.is_empty()
    }

    /// Choose uniformly among the finite (non-background) lights.
    pub fn sample_light(&self, rng: &mut dyn Sampler) -> Option<LightSample<'_>> {
        if self.lights.is_empty() {
            return None;
        }
        let count = self.lights.len();
        let index = ((rng.next() * count as f32) as usize).min(count - 1);
        Some(LightSample {
            light: self.lights[index].as_ref(),
            probability: 1.0 / count as f32,
        })
    }

    /// Background radiance for a ray that left the scene.
    pub fn evaluate_background(&self, direction: Vec3) -> Color {
        match &self.background {
            Some(envmap) => envmap.evaluate(direction),
            None => Color::BLACK,
        }
    }

    /// Emitted radiance carried by an intersection: the instance's emission
    /// for hits, the background for misses.
    pub fn evaluate_emission(&self, its: &Intersection<'_>) -> Color {
        match its.instance {
            Some(instance) => match instance.emission() {
                Some(emission) => {
                    let frame = its.shading_frame();
                    emission.evaluate(its.uv, frame.to_local(its.wo)).value
                }
                None => Color::BLACK,
            },
            None => self.evaluate_background(-its.wo),
        }
    }
}
