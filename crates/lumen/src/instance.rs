use std::sync::Arc;

use crate::{
    bsdf::Bsdf,
    emission::Emission,
    intersection::Intersection,
    math::{bounds::Bounds, point::Point, transform::Transform},
    ray::Ray,
    sampler::Sampler,
    shape::Shape,
    texture::Texture,
    EPSILON,
};

/// Upper bound on how many transparent alpha-mask hits a single query will
/// step through before giving up and reporting a miss. Keeps grazing rays
/// over coplanar transparent geometry from looping forever.
const MAX_ALPHA_SKIPS: u32 = 256;

/// A shape placed in the world, optionally with a transform, a BSDF, an
/// emission, and an alpha mask for stochastic transparency.
///
/// All attachments are shared immutable handles; the instance itself is
/// owned by the scene.
pub struct Instance {
    shape: Arc<dyn Shape>,
    bsdf: Option<Arc<dyn Bsdf>>,
    emission: Option<Arc<dyn Emission>>,
    alpha: Option<Arc<dyn Texture>>,
    transform: Option<Transform>,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl Instance {
    pub fn new(shape: Arc<dyn Shape>) -> Self {
        Self {
            shape,
            bsdf: None,
            emission: None,
            alpha: None,
            transform: None,
        }
    }

    pub fn with_bsdf(mut self, bsdf: Arc<dyn Bsdf>) -> Self {
        self.bsdf = Some(bsdf);
        self
    }

    pub fn with_emission(mut self, emission: Arc<dyn Emission>) -> Self {
        self.emission = Some(emission);
        self
    }

    pub fn with_alpha(mut self, alpha: Arc<dyn Texture>) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn bsdf(&self) -> Option<&dyn Bsdf> {
        self.bsdf.as_deref()
    }

    pub fn emission(&self) -> Option<&dyn Emission> {
        self.emission.as_deref()
    }

    /// Intersect the world-space ray. On success `its` holds a world-space
    /// hit attached to this instance; on any failure path `its` is restored
    /// to its exact pre-call state (traversal stats excepted).
    pub fn intersect<'a>(
        &'a self,
        world_ray: &Ray,
        its: &mut Intersection<'a>,
        rng: &mut dyn Sampler,
    ) -> bool {
        let previous = its.clone();

        // Map into local space; the direction length converts local t back
        // to world t. The allowed search bound must be re-expressed in local
        // distances as well.
        let (mut local_ray, local_bound) = match &self.transform {
            None => (*world_ray, previous.t),
            Some(transform) => {
                let (origin, direction) = transform.inverse_ray(world_ray);
                let length = direction.length();
                if length == 0.0 {
                    return false;
                }
                let local_ray = Ray::with_unit_direction(origin, direction / length);
                let bound = if previous.is_hit() {
                    (transform.inverse_point(previous.position) - local_ray.origin).length()
                } else {
                    f32::INFINITY
                };
                (local_ray, bound)
            }
        };

        // Walk forward through stochastic alpha rejections. `consumed` is
        // the local-space distance already skipped past transparent hits.
        let mut consumed = 0.0;
        let mut accepted = false;
        for _ in 0..MAX_ALPHA_SKIPS {
            its.t = local_bound - consumed;
            if its.t <= EPSILON {
                break;
            }
            if !self.shape.intersect(&local_ray, its, rng) {
                break;
            }

            if let Some(alpha) = &self.alpha {
                let alpha = alpha.scalar(its.uv).clamp(0.0, 1.0);
                if rng.next() >= alpha {
                    let step = its.t + EPSILON;
                    local_ray.origin = local_ray.at(step);
                    consumed += step;
                    continue;
                }
            }

            accepted = true;
            break;
        }

        if !accepted {
            restore(its, previous);
            return false;
        }

        its.t += consumed;
        its.instance = Some(self);

        if let Some(transform) = &self.transform {
            its.position = transform.apply_point(its.position);
            its.geometry_normal = transform.apply_normal(its.geometry_normal).normalize();
            its.shading_normal = transform.apply_normal(its.shading_normal).normalize();
            let tangent = transform.apply_vector(its.tangent).normalize_or_zero();
            if tangent != glam::Vec3::ZERO {
                its.tangent = tangent;
            }

            // world t is the distance to the transformed hit point; it can
            // exceed the incoming bound under anisotropic scaling
            its.t = (its.position - world_ray.origin).length();
            if its.t > previous.t {
                restore(its, previous);
                return false;
            }
        }

        debug_assert!(its.t.is_finite(), "non-finite intersection distance");
        debug_assert!(
            its.t >= EPSILON,
            "intersection susceptible to self-intersection: t = {}",
            its.t
        );
        true
    }

    /// The fraction of light passing this instance along `world_ray` within
    /// `t_max`. With an alpha mask the cheap shape transmittance is not
    /// enough, since individual hits may be transparent: the full stochastic
    /// intersection decides.
    pub fn transmittance(&self, world_ray: &Ray, t_max: f32, rng: &mut dyn Sampler) -> f32 {
        if self.alpha.is_some() {
            let mut its = Intersection::miss();
            if self.intersect(world_ray, &mut its, rng) && its.t < t_max {
                return 0.0;
            }
            return 1.0;
        }

        match &self.transform {
            None => self.shape.transmittance(world_ray, t_max, rng),
            Some(transform) => {
                let (origin, direction) = transform.inverse_ray(world_ray);
                let length = direction.length();
                if length == 0.0 {
                    return 0.0;
                }
                let local_ray = Ray::with_unit_direction(origin, direction / length);
                self.shape.transmittance(&local_ray, t_max * length, rng)
            }
        }
    }

    /// World-space bounds: the transformed corners of the local box.
    pub fn bounding_box(&self) -> Bounds {
        let local = self.shape.bounding_box();
        let Some(transform) = &self.transform else {
            return local;
        };
        if local.is_unbounded() {
            return Bounds::full();
        }

        let mut bounds = Bounds::empty();
        for corner in 0..8 {
            let mut p = local.min.vec();
            let max = local.max.vec();
            for axis in 0..3 {
                if (corner >> axis) & 1 == 1 {
                    p[axis] = max[axis];
                }
            }
            bounds.extend(transform.apply_point(Point(p)));
        }
        bounds
    }

    pub fn centroid(&self) -> Point {
        match &self.transform {
            None => self.shape.centroid(),
            Some(transform) => transform.apply_point(self.shape.centroid()),
        }
    }
}

fn restore<'a>(its: &mut Intersection<'a>, previous: Intersection<'a>) {
    let stats = its.stats;
    *its = previous;
    its.stats = stats;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::sampler::IndependentSampler;
    use crate::shape::Sphere;
    use crate::texture::ConstantTexture;
    use glam::Vec3;

    fn sphere_instance() -> Instance {
        Instance::new(Arc::new(Sphere))
    }

    #[test]
    fn transform_scales_the_hit_distance() {
        let mut rng = IndependentSampler::new(0);
        let instance =
            sphere_instance().with_transform(Transform::scaling(Vec3::splat(2.0)));
        let ray = Ray::new(Point::new(0.0, 0.0, -4.0), Vec3::Z);
        let mut its = Intersection::miss();

        assert!(instance.intersect(&ray, &mut its, &mut rng));
        assert!((its.t - 2.0).abs() < 1e-4);
        assert!((its.position - Point::new(0.0, 0.0, -2.0)).length() < 1e-4);
        assert!((its.geometry_normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn nonuniform_scaling_keeps_normals_perpendicular() {
        let mut rng = IndependentSampler::new(0);
        let instance =
            sphere_instance().with_transform(Transform::scaling(Vec3::new(2.0, 1.0, 1.0)));
        // hit the flank of the ellipsoid
        let ray = Ray::new(Point::new(1.0, 0.0, -4.0), Vec3::Z);
        let mut its = Intersection::miss();

        assert!(instance.intersect(&ray, &mut its, &mut rng));
        // the surface at that point is x²/4 + y² + z² = 1; check the normal
        // against the analytic gradient (x/4, y, z)
        let p = its.position.vec();
        let expected = Vec3::new(p.x / 4.0, p.y, p.z).normalize();
        assert!((its.geometry_normal - expected).length() < 1e-3);
        assert!((its.geometry_normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_alpha_is_empty_space() {
        let mut rng = IndependentSampler::new(0);
        let instance = sphere_instance().with_alpha(Arc::new(ConstantTexture::new(Color::BLACK)));
        let ray = Ray::new(Point::new(0.0, 0.0, -2.0), Vec3::Z);

        for _ in 0..64 {
            let mut its = Intersection::miss();
            assert!(!instance.intersect(&ray, &mut its, &mut rng));
            assert!(!its.is_hit());
        }
        assert_eq!(instance.transmittance(&ray, f32::INFINITY, &mut rng), 1.0);
    }

    #[test]
    fn full_alpha_is_opaque() {
        let mut rng = IndependentSampler::new(0);
        let instance = sphere_instance().with_alpha(Arc::new(ConstantTexture::new(Color::WHITE)));
        let ray = Ray::new(Point::new(0.0, 0.0, -2.0), Vec3::Z);

        let mut its = Intersection::miss();
        assert!(instance.intersect(&ray, &mut its, &mut rng));
        assert!((its.t - 1.0).abs() < 1e-5);
        assert_eq!(instance.transmittance(&ray, 2.0, &mut rng), 0.0);
    }

    #[test]
    fn failed_intersection_restores_the_record() {
        let mut rng = IndependentSampler::new(0);
        let instance = sphere_instance();
        let ray = Ray::new(Point::new(0.0, 5.0, -2.0), Vec3::Z);

        let mut its = Intersection::with_limit(123.0);
        its.uv = glam::Vec2::new(0.25, 0.75);
        let before = its.clone();

        assert!(!instance.intersect(&ray, &mut its, &mut rng));
        assert!(its == before);
    }

    #[test]
    fn does_not_overwrite_a_closer_hit() {
        let mut rng = IndependentSampler::new(0);
        let instance = sphere_instance();
        let ray = Ray::new(Point::new(0.0, 0.0, -2.0), Vec3::Z);

        let mut its = Intersection::with_limit(0.5);
        let before = its.clone();
        assert!(!instance.intersect(&ray, &mut its, &mut rng));
        assert!(its == before);
    }

    #[test]
    fn world_bounds_cover_the_transformed_shape() {
        let instance = sphere_instance().with_transform(
            Transform::scaling(Vec3::splat(3.0)).then(&Transform::translation(Vec3::X * 10.0)),
        );
        let bounds = instance.bounding_box();
        assert!((bounds.min.vec() - Vec3::new(7.0, -3.0, -3.0)).length() < 1e-4);
        assert!((bounds.max.vec() - Vec3::new(13.0, 3.0, 3.0)).length() < 1e-4);
    }
}
