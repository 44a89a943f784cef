//! Primitive surfaces and participating media.
//!
//! A shape lives in its own local coordinate system; world placement,
//! materials and alpha masks are the business of
//! [crate::instance::Instance].

pub mod mesh;
pub mod sphere;
pub mod volume;

pub use mesh::{Mesh, Vertex};
pub use sphere::Sphere;
pub use volume::Volume;

use glam::{Vec2, Vec3};

use crate::{
    error::Error,
    intersection::Intersection,
    math::{bounds::Bounds, point::Point},
    ray::Ray,
    sampler::Sampler,
    Result,
};

/// A uniformly sampled point on a shape's surface, for area lights.
#[derive(Debug, Clone, Copy)]
pub struct AreaSample {
    pub position: Point,
    pub uv: Vec2,
    pub geometry_normal: Vec3,
    pub shading_normal: Vec3,
    pub tangent: Vec3,
    /// Probability density per unit area.
    pub pdf: f32,
}

pub trait Shape: Send + Sync {
    /// Test the ray against the shape and update `its` only if a hit exists
    /// with `EPSILON <= t < its.t`. Returns whether `its` was updated.
    fn intersect<'a>(&self, ray: &Ray, its: &mut Intersection<'a>, rng: &mut dyn Sampler) -> bool;

    /// The fraction of light that makes it along `ray` up to `t_max`.
    /// Opaque surfaces return 0 when hit and 1 otherwise; media return
    /// fractional values.
    fn transmittance(&self, ray: &Ray, t_max: f32, rng: &mut dyn Sampler) -> f32 {
        let mut its = Intersection::with_limit(t_max);
        if self.intersect(ray, &mut its, rng) {
            0.0
        } else {
            1.0
        }
    }

    fn bounding_box(&self) -> Bounds;

    fn centroid(&self) -> Point;

    /// Uniform area sampling, for shapes that support serving as area
    /// lights. Not implemented by the current shapes.
    fn sample_area(&self, _rng: &mut dyn Sampler) -> Result<AreaSample> {
        Err(Error::Unimplemented("area sampling"))
    }
}
