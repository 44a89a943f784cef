use glam::Vec3;

use crate::{math::point::Point, ray::Ray};

/// Axis aligned bounding box stored as min/max corners.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// The empty box: extending it with any point yields that point.
    pub fn empty() -> Self {
        Self {
            min: Point(Vec3::INFINITY),
            max: Point(Vec3::NEG_INFINITY),
        }
    }

    /// A box containing all of space, used by unbounded shapes.
    pub fn full() -> Self {
        Self {
            min: Point(Vec3::NEG_INFINITY),
            max: Point(Vec3::INFINITY),
        }
    }

    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            min: Point(a.vec().min(b.vec())),
            max: Point(a.vec().max(b.vec())),
        }
    }

    pub fn extend(&mut self, p: Point) {
        self.min = Point(self.min.vec().min(p.vec()));
        self.max = Point(self.max.vec().max(p.vec()));
    }

    pub fn union(a: Self, b: Self) -> Self {
        Self {
            min: Point(a.min.vec().min(b.min.vec())),
            max: Point(a.max.vec().max(b.max.vec())),
        }
    }

    pub fn centroid(&self) -> Point {
        Point(0.5 * (self.min.vec() + self.max.vec()))
    }

    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn largest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    pub fn is_unbounded(&self) -> bool {
        !self.min.vec().is_finite() || !self.max.vec().is_finite()
    }

    /// Slab test. Returns the parametric overlap of the ray with the box, or
    /// None if they do not meet. The near value may be negative when the ray
    /// starts inside.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<(f32, f32)> {
        // Division by a zero direction component yields ±inf, which the
        // min/max below handle; NaN from inf*0 is avoided by the unbounded
        // check in callers building boxes from finite points.
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;

        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        if t_near > t_far {
            None
        } else {
            Some((t_near, t_far))
        }
    }
}
