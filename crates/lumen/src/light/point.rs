use std::f32::consts::PI;

use crate::{color::Color, math::point::Point, sampler::Sampler};

use super::{DirectLightSample, Light};

/// An isotropic point emitter described by its total power.
pub struct PointLight {
    position: Point,
    /// power / 4π, precomputed
    intensity: Color,
}

impl PointLight {
    pub fn new(position: Point, power: Color) -> Self {
        Self {
            position,
            intensity: power / (4.0 * PI),
        }
    }
}

impl Light for PointLight {
    fn sample_direct(&self, origin: Point, _rng: &mut dyn Sampler) -> Option<DirectLightSample> {
        let to_light = self.position - origin;
        let distance = to_light.length();
        if distance == 0.0 {
            return None;
        }

        Some(DirectLightSample {
            wi: to_light / distance,
            weight: self.intensity / (distance * distance),
            distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::IndependentSampler;
    use glam::Vec3;

    #[test]
    fn inverse_square_falloff() {
        let light = PointLight::new(Point::new(0.0, 2.0, 0.0), Color::splat(4.0 * PI));
        let mut rng = IndependentSampler::new(0);

        let sample = light.sample_direct(Point::ORIGIN, &mut rng).unwrap();
        assert!((sample.wi - Vec3::Y).length() < 1e-6);
        assert!((sample.distance - 2.0).abs() < 1e-6);
        // power/(4π d²) with power = 4π gives 1/4
        assert!((sample.weight.mean() - 0.25).abs() < 1e-6);
    }
}
