use glam::{UVec2, Vec2, Vec3};

use crate::{
    color::Color,
    math::{point::Point, transform::Transform},
    ray::Ray,
    sampler::Sampler,
};

/// A primary ray with its importance weight.
pub struct CameraSample {
    pub ray: Ray,
    pub weight: Color,
}

/// Maps normalized image coordinates in [-1, 1]² (x right, y up) to
/// world-space primary rays. The driver supplies the pixel jitter.
pub trait Camera: Send + Sync {
    fn resolution(&self) -> UVec2;

    fn sample(&self, normalized: Vec2, rng: &mut dyn Sampler) -> CameraSample;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FovAxis {
    X,
    Y,
}

/// A pinhole perspective camera. In local coordinates it looks along +z;
/// `transform` places it in the world.
pub struct Perspective {
    resolution: UVec2,
    transform: Transform,
    /// tangent-space extent of the image plane at z = 1
    spread: Vec2,
}

impl Perspective {
    pub fn new(resolution: UVec2, transform: Transform, fov_degrees: f32, fov_axis: FovAxis) -> Self {
        let tan_half = (fov_degrees.to_radians() / 2.0).tan();
        let aspect = resolution.x as f32 / resolution.y as f32;

        let spread = match fov_axis {
            FovAxis::X => Vec2::new(tan_half, tan_half / aspect),
            FovAxis::Y => Vec2::new(tan_half * aspect, tan_half),
        };

        Self {
            resolution,
            transform,
            spread,
        }
    }
}

impl Camera for Perspective {
    fn resolution(&self) -> UVec2 {
        self.resolution
    }

    fn sample(&self, normalized: Vec2, _rng: &mut dyn Sampler) -> CameraSample {
        let local = Vec3::new(
            normalized.x * self.spread.x,
            normalized.y * self.spread.y,
            1.0,
        );

        let origin = self.transform.apply_point(Point::ORIGIN);
        let direction = self.transform.apply_vector(local);

        CameraSample {
            ray: Ray::new(origin, direction),
            weight: Color::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::IndependentSampler;

    #[test]
    fn center_ray_goes_straight_ahead() {
        let camera = Perspective::new(
            UVec2::new(200, 100),
            Transform::IDENTITY,
            90.0,
            FovAxis::X,
        );
        let mut rng = IndependentSampler::new(0);

        let sample = camera.sample(Vec2::ZERO, &mut rng);
        assert!((sample.ray.direction - Vec3::Z).length() < 1e-6);
        assert_eq!(sample.weight, Color::WHITE);
    }

    #[test]
    fn fov_axis_sets_the_edge_angle() {
        let camera = Perspective::new(
            UVec2::new(200, 100),
            Transform::IDENTITY,
            90.0,
            FovAxis::X,
        );
        let mut rng = IndependentSampler::new(0);

        // the right edge of a 90° horizontal fov is 45° off axis
        let sample = camera.sample(Vec2::new(1.0, 0.0), &mut rng);
        let angle = sample.ray.direction.dot(Vec3::Z).acos();
        assert!((angle - 45.0f32.to_radians()).abs() < 1e-4);

        // vertical spread is halved by the 2:1 aspect ratio
        let sample = camera.sample(Vec2::new(0.0, 1.0), &mut rng);
        let tan_v = sample.ray.direction.y / sample.ray.direction.z;
        assert!((tan_v - 0.5).abs() < 1e-5);
    }

    #[test]
    fn transform_moves_the_ray_origin() {
        let transform = Transform::look_at(Point::new(0.0, 1.0, -5.0), Point::new(0.0, 1.0, 0.0), Vec3::Y);
        let camera = Perspective::new(UVec2::new(64, 64), transform, 60.0, FovAxis::Y);
        let mut rng = IndependentSampler::new(0);

        let sample = camera.sample(Vec2::ZERO, &mut rng);
        assert!((sample.ray.origin - Point::new(0.0, 1.0, -5.0)).length() < 1e-5);
        assert!((sample.ray.direction - Vec3::Z).length() < 1e-5);
    }
}
