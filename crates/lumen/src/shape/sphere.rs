use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::{
    intersection::Intersection,
    math::{bounds::Bounds, point::Point},
    ray::Ray,
    sampler::Sampler,
    EPSILON,
};

use super::Shape;

/// The unit sphere centered at the origin. Size and placement come from the
/// owning instance's transform.
pub struct Sphere;

impl Sphere {
    fn populate(its: &mut Intersection<'_>, position: Point) {
        let local = position.vec().normalize();

        // spherical map: u wraps around the y axis, v runs pole to pole
        let theta = local.z.atan2(local.x);
        let phi = local.y.clamp(-1.0, 1.0).acos();
        its.uv = Vec2::new(1.0 - (theta + PI) / (2.0 * PI), phi / PI);

        its.position = position;
        its.geometry_normal = local;
        its.shading_normal = local;

        // tangent along increasing theta; degenerate at the poles
        let tangent = Vec3::new(-local.z, 0.0, local.x);
        its.tangent = if tangent.length_squared() > 1e-16 {
            tangent.normalize()
        } else {
            Vec3::X
        };
        its.pdf = 1.0;
    }
}

impl Shape for Sphere {
    fn intersect<'a>(&self, ray: &Ray, its: &mut Intersection<'a>, _rng: &mut dyn Sampler) -> bool {
        // |o + t d|² = 1 with d normalized, so the quadratic has a = 1
        let o = ray.origin.vec();
        let b = 2.0 * o.dot(ray.direction);
        let c = o.length_squared() - 1.0;

        let disc = b * b - 4.0 * c;
        if disc < 0.0 {
            return false;
        }
        let sqrt_disc = disc.sqrt();

        let near = (-b - sqrt_disc) * 0.5;
        let far = (-b + sqrt_disc) * 0.5;

        let t = if near >= EPSILON && near < its.t {
            near
        } else if far >= EPSILON && far < its.t {
            far
        } else {
            return false;
        };

        its.t = t;
        Self::populate(its, ray.at(t));
        true
    }

    fn bounding_box(&self) -> Bounds {
        Bounds::from_points(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0))
    }

    fn centroid(&self) -> Point {
        Point::ORIGIN
    }
}
