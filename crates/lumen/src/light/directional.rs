use glam::Vec3;

use crate::{color::Color, math::point::Point, sampler::Sampler};

use super::{DirectLightSample, Light};

/// A light at infinity: constant intensity from a fixed direction, no
/// falloff and no parallax.
pub struct DirectionalLight {
    direction: Vec3,
    intensity: Color,
}

impl DirectionalLight {
    /// `direction` points from the receiver toward the light.
    pub fn new(direction: Vec3, intensity: Color) -> Self {
        Self {
            direction: direction.normalize(),
            intensity,
        }
    }
}

impl Light for DirectionalLight {
    fn sample_direct(&self, _origin: Point, _rng: &mut dyn Sampler) -> Option<DirectLightSample> {
        Some(DirectLightSample {
            wi: self.direction,
            weight: self.intensity,
            distance: f32::INFINITY,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::IndependentSampler;

    #[test]
    fn constant_everywhere() {
        let light = DirectionalLight::new(Vec3::new(0.0, 2.0, 0.0), Color::splat(3.0));
        let mut rng = IndependentSampler::new(0);

        for origin in [Point::ORIGIN, Point::new(100.0, -3.0, 7.0)] {
            let sample = light.sample_direct(origin, &mut rng).unwrap();
            assert!((sample.wi - Vec3::Y).length() < 1e-6);
            assert_eq!(sample.weight, Color::splat(3.0));
            assert!(sample.distance.is_infinite());
        }
    }
}
