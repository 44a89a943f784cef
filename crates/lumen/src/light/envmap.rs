use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{
    color::Color,
    math::{distributions::square_to_uniform_sphere, point::Point, transform::Transform},
    sampler::Sampler,
    texture::Texture,
};

use super::{DirectLightSample, Light};

/// An equirectangular environment map covering the full sphere of
/// directions. Rays that leave the scene evaluate it as background
/// radiance; next-event estimation samples it uniformly over the sphere.
pub struct EnvironmentMap {
    texture: Arc<dyn Texture>,
    transform: Option<Transform>,
}

impl EnvironmentMap {
    pub fn new(texture: Arc<dyn Texture>, transform: Option<Transform>) -> Self {
        Self { texture, transform }
    }

    /// Background radiance for a world-space direction.
    pub fn evaluate(&self, direction: Vec3) -> Color {
        let local = match &self.transform {
            Some(transform) => transform.inverse_vector(direction).normalize(),
            None => direction,
        };

        // equirectangular: φ wraps around +y, θ runs from the +y pole down
        let phi = (-local.z).atan2(local.x) + PI;
        let theta = (local.x * local.x + local.z * local.z).sqrt().atan2(local.y);

        let uv = Vec2::new(phi / (2.0 * PI), theta / PI);
        self.texture.evaluate(uv)
    }
}

impl Light for EnvironmentMap {
    fn sample_direct(&self, _origin: Point, rng: &mut dyn Sampler) -> Option<DirectLightSample> {
        let direction = square_to_uniform_sphere(rng.next2d());

        // uniform sphere pdf is 1/4π
        Some(DirectLightSample {
            wi: direction,
            weight: self.evaluate(direction) * (4.0 * PI),
            distance: f32::INFINITY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::IndependentSampler;

    /// A texture that encodes its uv coordinate, making the mapping
    /// observable from the outside.
    struct UvProbe;
    impl Texture for UvProbe {
        fn evaluate(&self, uv: Vec2) -> Color {
            Color::new(uv.x, uv.y, 0.0)
        }
    }

    fn uv_of(direction: Vec3) -> Vec2 {
        let envmap = EnvironmentMap::new(Arc::new(UvProbe), None);
        let c = envmap.evaluate(direction);
        Vec2::new(c.r(), c.g())
    }

    #[test]
    fn canonical_directions() {
        let eps = 1e-5;

        let uv = uv_of(Vec3::X);
        assert!((uv - Vec2::new(0.5, 0.5)).length() < eps);

        assert!(uv_of(Vec3::Y).y < eps);
        assert!(uv_of(Vec3::NEG_Y).y > 1.0 - eps);

        let uv = uv_of(Vec3::Z);
        assert!((uv - Vec2::new(0.25, 0.5)).length() < eps);
        let uv = uv_of(Vec3::NEG_Z);
        assert!((uv - Vec2::new(0.75, 0.5)).length() < eps);

        // -x maps to the seam; both u=0 and u=1 are acceptable
        let uv = uv_of(Vec3::NEG_X);
        assert!(uv.x.min(1.0 - uv.x) < eps && (uv.y - 0.5).abs() < eps);
    }

    #[test]
    fn sampling_weight_is_radiance_times_sphere_area() {
        let envmap = EnvironmentMap::new(
            Arc::new(crate::texture::ConstantTexture::new(Color::splat(0.5))),
            None,
        );
        let mut rng = IndependentSampler::new(2);

        let sample = envmap.sample_direct(Point::ORIGIN, &mut rng).unwrap();
        assert!((sample.wi.length() - 1.0).abs() < 1e-5);
        assert!(sample.distance.is_infinite());
        assert!((sample.weight.mean() - 0.5 * 4.0 * PI).abs() < 1e-4);
    }

    #[test]
    fn transform_rotates_the_lookup() {
        // rotating the map by 90° about y moves the +x lookup to what was
        // previously at another azimuth, but leaves the poles alone
        let rotated = EnvironmentMap::new(
            Arc::new(UvProbe),
            Some(Transform::rotation(Vec3::Y, PI / 2.0)),
        );
        let pole = rotated.evaluate(Vec3::Y);
        assert!(pole.g() < 1e-5);

        let equator = rotated.evaluate(Vec3::X);
        assert!((equator.g() - 0.5).abs() < 1e-5);
        assert!((equator.r() - 0.5).abs() > 0.1);
    }
}
