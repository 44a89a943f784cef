use std::sync::Arc;

use glam::Vec2;

use crate::{
    intersection::Intersection,
    math::{bounds::Bounds, frame::Frame, point::Point},
    ray::Ray,
    sampler::Sampler,
    EPSILON,
};

use super::Shape;

/// A homogeneous participating medium with extinction equal to `density`,
/// optionally limited to the inside of a boundary shape.
///
/// "Intersections" are scattering events sampled from the free-flight
/// distribution; transmittance follows Beer–Lambert over the overlap of the
/// query interval with the medium.
pub struct Volume {
    density: f32,
    boundary: Option<Arc<dyn Shape>>,
}

impl Volume {
    pub fn new(density: f32, boundary: Option<Arc<dyn Shape>>) -> Self {
        Self { density, boundary }
    }

    /// The parametric interval along `ray` that lies inside the medium, or
    /// None if the ray misses the boundary entirely.
    fn interval(&self, ray: &Ray, rng: &mut dyn Sampler) -> Option<(f32, f32)> {
        let Some(boundary) = &self.boundary else {
            return Some((0.0, f32::INFINITY));
        };

        let mut entry = Intersection::miss();
        if !boundary.intersect(ray, &mut entry, rng) {
            return None;
        }

        if entry.geometry_normal.dot(ray.direction) < 0.0 {
            // entering from the outside: trace again from just past the
            // entry point to find the matching exit
            let t_entry = entry.t;
            let inside = Ray::with_unit_direction(ray.at(t_entry + EPSILON), ray.direction);

            let mut exit = Intersection::miss();
            let t_exit = if boundary.intersect(&inside, &mut exit, rng) {
                t_entry + exit.t
            } else {
                f32::INFINITY
            };
            Some((t_entry, t_exit))
        } else {
            // already inside: the hit is the exit
            Some((0.0, entry.t))
        }
    }
}

impl Shape for Volume {
    fn intersect<'a>(&self, ray: &Ray, its: &mut Intersection<'a>, rng: &mut dyn Sampler) -> bool {
        let Some((t_entry, t_exit)) = self.interval(ray, rng) else {
            return false;
        };

        // free-flight distance s with density exp(-σ s); clamp u below 1 to
        // keep the log finite
        let u = rng.next().min(1.0 - EPSILON);
        let distance = (-(1.0 - u).ln() / self.density).max(EPSILON);

        let t_hit = t_entry + distance;
        if t_hit >= t_exit || t_hit >= its.t {
            return false;
        }

        its.t = t_hit;
        its.position = ray.at(t_hit);

        let normal = -ray.direction;
        its.geometry_normal = normal;
        its.shading_normal = normal;
        its.tangent = Frame::new(normal).tangent;
        its.uv = Vec2::ZERO;
        its.pdf = 1.0;
        true
    }

    fn transmittance(&self, ray: &Ray, t_max: f32, rng: &mut dyn Sampler) -> f32 {
        let Some((t_entry, t_exit)) = self.interval(ray, rng) else {
            return 1.0;
        };

        let t0 = t_entry.max(0.0);
        let t1 = t_exit.min(t_max);
        if t0 >= t1 {
            return 1.0;
        }

        (-self.density * (t1 - t0)).exp()
    }

    fn bounding_box(&self) -> Bounds {
        match &self.boundary {
            Some(boundary) => boundary.bounding_box(),
            None => Bounds::full(),
        }
    }

    fn centroid(&self) -> Point {
        match &self.boundary {
            Some(boundary) => boundary.centroid(),
            None => Point::ORIGIN,
        }
    }
}
