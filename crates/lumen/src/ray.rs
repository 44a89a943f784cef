use glam::Vec3;

use crate::math::point::Point;

/// A ray with a normalized direction. The maximum distance a ray is allowed
/// to travel is not stored here; it is carried by the `t` of the
/// [crate::intersection::Intersection] being refined, or passed explicitly to
/// transmittance queries.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Build a ray without normalizing; callers must pass a unit direction.
    pub fn with_unit_direction(origin: Point, direction: Vec3) -> Self {
        debug_assert!((direction.length_squared() - 1.0).abs() < 1e-4);
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::Ray;
    use crate::math::point::Point;
    use glam::Vec3;

    #[test]
    fn at_walks_along_direction() {
        let ray = Ray::new(Point::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert!((ray.at(0.0) - ray.origin).length() < 1e-6);
        assert!((ray.at(3.0) - Point::new(1.0, 3.0, 0.0)).length() < 1e-6);
    }
}
