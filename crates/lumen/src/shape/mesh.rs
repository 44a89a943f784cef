use glam::{Vec2, Vec3};

use crate::{
    accel::Bvh,
    intersection::Intersection,
    math::{bounds::Bounds, frame::Frame, point::Point},
    ray::Ray,
    sampler::Sampler,
    EPSILON,
};

use super::Shape;

#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// A triangle mesh with a shared vertex buffer and a per-mesh BVH.
///
/// With `smooth_normals` the shading normal interpolates the vertex normals
/// barycentrically; otherwise it equals the geometric normal. Tangents come
/// from the uv gradient when the parameterization is usable.
pub struct Mesh {
    vertices: Vec<Vertex>,
    triangles: Vec<[u32; 3]>,
    smooth_normals: bool,
    accel: Bvh,
    bounds: Bounds,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u32; 3]>, smooth_normals: bool) -> Self {
        let triangle_bounds: Vec<Bounds> = triangles
            .iter()
            .map(|tri| {
                let mut b = Bounds::empty();
                for &i in tri {
                    b.extend(vertices[i as usize].position);
                }
                b
            })
            .collect();

        let bounds = triangle_bounds
            .iter()
            .copied()
            .fold(Bounds::empty(), Bounds::union);

        log::debug!(
            "built mesh with {} triangles, {} vertices",
            triangles.len(),
            vertices.len()
        );

        Self {
            vertices,
            triangles,
            smooth_normals,
            accel: Bvh::build(&triangle_bounds),
            bounds,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Möller–Trumbore against one triangle, updating `its` on a closer hit.
    fn intersect_triangle(&self, index: u32, ray: &Ray, its: &mut Intersection<'_>) -> bool {
        let [i0, i1, i2] = self.triangles[index as usize];
        let v0 = self.vertices[i0 as usize];
        let v1 = self.vertices[i1 as usize];
        let v2 = self.vertices[i2 as usize];

        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;

        let pvec = ray.direction.cross(edge2);
        let det = edge1.dot(pvec);
        if det.abs() < 1e-6 {
            return false;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin - v0.position;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let qvec = tvec.cross(edge1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || v > 1.0 || u + v > 1.0 {
            return false;
        }

        let t = edge2.dot(qvec) * inv_det;
        if t < EPSILON || t >= its.t {
            return false;
        }

        let w = 1.0 - u - v;
        its.t = t;
        its.position = ray.at(t);
        its.uv = w * v0.uv + u * v1.uv + v * v2.uv;

        let geometric = edge1.cross(edge2).normalize();
        its.geometry_normal = geometric;
        its.shading_normal = if self.smooth_normals {
            let blended = w * v0.normal + u * v1.normal + v * v2.normal;
            let blended = blended.normalize_or_zero();
            if blended == Vec3::ZERO {
                geometric
            } else {
                blended
            }
        } else {
            geometric
        };

        its.tangent = Self::uv_tangent(&v0, &v1, &v2, edge1, edge2)
            .unwrap_or_else(|| Frame::new(its.shading_normal).tangent);
        its.pdf = 1.0;
        true
    }

    /// Tangent along the u gradient of the surface parameterization, or None
    /// when the uv Jacobian is degenerate (e.g. a mesh without texture
    /// coordinates).
    fn uv_tangent(v0: &Vertex, v1: &Vertex, v2: &Vertex, edge1: Vec3, edge2: Vec3) -> Option<Vec3> {
        let duv1 = v1.uv - v0.uv;
        let duv2 = v2.uv - v0.uv;
        let det = duv1.x * duv2.y - duv1.y * duv2.x;
        if det.abs() <= 1e-10 {
            return None;
        }
        let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
        let tangent = tangent.normalize_or_zero();
        (tangent != Vec3::ZERO).then_some(tangent)
    }
}

impl Shape for Mesh {
    fn intersect<'a>(&self, ray: &Ray, its: &mut Intersection<'a>, _rng: &mut dyn Sampler) -> bool {
        let mut stats = std::mem::take(&mut its.stats);
        let mut hit = false;

        let entry_t = its.t;
        self.accel.traverse(ray, entry_t, &mut stats, &mut |prim, bound| {
            debug_assert!(its.t <= bound);
            if self.intersect_triangle(prim, ray, its) {
                hit = true;
            }
            its.t
        });

        its.stats = stats;
        hit
    }

    fn bounding_box(&self) -> Bounds {
        self.bounds
    }

    fn centroid(&self) -> Point {
        self.bounds.centroid()
    }
}
