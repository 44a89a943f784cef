use glam::Vec3;

/// An orthonormal shading basis whose +z axis is the surface normal.
///
/// BSDFs operate in the local coordinates of such a frame, where the cosine
/// terms of the rendering equation reduce to z components.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Construct a frame from a single unit vector using the algorithm of
    /// “Building an Orthonormal Basis, Revisited” (Duff et al., JCGT 2017).
    /// `n` is expected to be normalized and becomes the +z axis.
    pub fn new(n: Vec3) -> Self {
        let sign = 1.0f32.copysign(n.z);
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        Self {
            tangent: Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
            bitangent: Vec3::new(b, sign + n.y * n.y * a, -n.y),
            normal: n,
        }
    }

    /// Construct a frame from a normal and a (not necessarily orthogonal)
    /// tangent hint, e.g. interpolated from a mesh. The tangent is
    /// re-orthogonalized against the normal; if that degenerates, the
    /// deterministic basis of [Frame::new] is used instead.
    pub fn from_shading(normal: Vec3, tangent: Vec3) -> Self {
        let t = tangent - normal * normal.dot(tangent);
        let len2 = t.length_squared();
        if len2 < 1e-12 {
            return Self::new(normal);
        }
        let tangent = t / len2.sqrt();
        Self {
            tangent,
            bitangent: normal.cross(tangent),
            normal,
        }
    }

    pub fn to_local(&self, world: Vec3) -> Vec3 {
        Vec3::new(
            world.dot(self.tangent),
            world.dot(self.bitangent),
            world.dot(self.normal),
        )
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local.x * self.tangent + local.y * self.bitangent + local.z * self.normal
    }

    pub fn cos_theta(v: Vec3) -> f32 {
        v.z
    }

    pub fn abs_cos_theta(v: Vec3) -> f32 {
        v.z.abs()
    }

    pub fn same_hemisphere(a: Vec3, b: Vec3) -> bool {
        a.z * b.z > 0.0
    }
}
