use glam::{Mat3, Mat4, Vec3};

use crate::{math::point::Point, ray::Ray};

/// An affine transformation together with its inverse.
///
/// Both matrices are kept in sync by construction; composing transforms
/// composes both sides. Normals are transformed with the inverse transpose.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    matrix: Mat4,
    inverse: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
    };

    /// Wrap an affine matrix. The matrix must be invertible.
    pub fn from_matrix(matrix: Mat4) -> Self {
        debug_assert!(matrix.determinant().abs() > 1e-12);
        Self {
            matrix,
            inverse: matrix.inverse(),
        }
    }

    pub fn translation(offset: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(offset),
            inverse: Mat4::from_translation(-offset),
        }
    }

    pub fn scaling(factors: Vec3) -> Self {
        Self {
            matrix: Mat4::from_scale(factors),
            inverse: Mat4::from_scale(1.0 / factors),
        }
    }

    pub fn rotation(axis: Vec3, angle: f32) -> Self {
        Self {
            matrix: Mat4::from_axis_angle(axis.normalize(), angle),
            inverse: Mat4::from_axis_angle(axis.normalize(), -angle),
        }
    }

    /// A camera-style transform: places the origin at `origin`, looking
    /// toward `target`, with +y roughly along `up` and +z the view direction.
    pub fn look_at(origin: Point, target: Point, up: Vec3) -> Self {
        let forward = (target - origin).normalize();
        let right = up.cross(forward).normalize();
        let true_up = forward.cross(right);
        Self::from_matrix(Mat4::from_cols(
            right.extend(0.0),
            true_up.extend(0.0),
            forward.extend(0.0),
            origin.vec().extend(1.0),
        ))
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform) -> Self {
        Self {
            matrix: next.matrix * self.matrix,
            inverse: self.inverse * next.inverse,
        }
    }

    pub fn apply_point(&self, p: Point) -> Point {
        Point(self.matrix.transform_point3(p.vec()))
    }

    pub fn apply_vector(&self, v: Vec3) -> Vec3 {
        self.matrix.transform_vector3(v)
    }

    /// Transform a surface normal with the inverse transpose. The result is
    /// not normalized.
    pub fn apply_normal(&self, n: Vec3) -> Vec3 {
        Mat3::from_mat4(self.inverse).transpose() * n
    }

    pub fn inverse_point(&self, p: Point) -> Point {
        Point(self.inverse.transform_point3(p.vec()))
    }

    pub fn inverse_vector(&self, v: Vec3) -> Vec3 {
        self.inverse.transform_vector3(v)
    }

    /// Map a world-space ray into local space. The returned direction is NOT
    /// normalized: its length is the factor converting local distances back
    /// to world distances.
    pub fn inverse_ray(&self, ray: &Ray) -> (Point, Vec3) {
        (
            self.inverse_point(ray.origin),
            self.inverse_vector(ray.direction),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn normal_uses_inverse_transpose() {
        // A non-uniform scale must not preserve normal directions naively:
        // the surface z = x has normal (-1, 0, 1)/√2; squashing x by 2 turns
        // the surface into z = 2x, whose normal is (-2, 0, 1)/√5.
        let t = Transform::scaling(Vec3::new(0.5, 1.0, 1.0));
        let n = t.apply_normal(Vec3::new(-1.0, 0.0, 1.0)).normalize();
        let expected = Vec3::new(-2.0, 0.0, 1.0).normalize();
        assert!((n - expected).length() < 1e-6);
    }

    #[test]
    fn inverse_roundtrip() {
        let t = Transform::translation(Vec3::new(1.0, 2.0, 3.0))
            .then(&Transform::rotation(Vec3::Y, 0.7))
            .then(&Transform::scaling(Vec3::splat(2.0)));
        let p = Point::new(0.3, -1.2, 4.0);
        let back = t.inverse_point(t.apply_point(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn look_at_maps_forward_to_target() {
        let t = Transform::look_at(Point::new(0.0, 0.0, -2.0), Point::ORIGIN, Vec3::Y);
        let dir = t.apply_vector(Vec3::Z);
        assert!((dir.normalize() - Vec3::Z).length() < 1e-6);
        let origin = t.apply_point(Point::ORIGIN);
        assert!((origin - Point::new(0.0, 0.0, -2.0)).length() < 1e-6);
    }
}
