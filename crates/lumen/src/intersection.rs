use glam::{Vec2, Vec3};

use crate::{
    bsdf::{BsdfEval, BsdfSample},
    instance::Instance,
    math::{frame::Frame, point::Point},
    sampler::Sampler,
};

/// Diagnostic counters filled during acceleration-structure traversal.
///
/// These feed the debug heatmap output only; they are excluded from
/// [Intersection] equality and from the restoration guarantees of
/// [Instance::intersect].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStats {
    pub bvh_nodes: u32,
    pub prim_tests: u32,
}

/// The result of tracing a ray against the scene. A miss is a first-class
/// value: `t` is infinite and no instance is attached.
///
/// While an intersection is being refined, `t` doubles as the search bound:
/// shapes only report hits strictly closer than the current `t` (and not
/// closer than [crate::EPSILON]).
#[derive(Debug, Clone)]
pub struct Intersection<'a> {
    pub t: f32,
    pub position: Point,
    pub uv: Vec2,
    pub geometry_normal: Vec3,
    pub shading_normal: Vec3,
    pub tangent: Vec3,
    /// Area pdf of the hit point; only meaningful for area-sampled surfaces.
    pub pdf: f32,
    /// World-space direction pointing back along the ray that produced this
    /// intersection.
    pub wo: Vec3,
    pub instance: Option<&'a Instance>,
    pub stats: TraversalStats,
}

impl<'a> Intersection<'a> {
    pub fn miss() -> Self {
        Self::with_limit(f32::INFINITY)
    }

    /// A miss that only accepts hits closer than `t_max`, used for shadow
    /// and transmittance queries.
    pub fn with_limit(t_max: f32) -> Self {
        Self {
            t: t_max,
            position: Point::ORIGIN,
            uv: Vec2::ZERO,
            geometry_normal: Vec3::Z,
            shading_normal: Vec3::Z,
            tangent: Vec3::X,
            pdf: 0.0,
            wo: Vec3::Z,
            instance: None,
            stats: TraversalStats::default(),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.instance.is_some()
    }

    /// The local shading basis: +z is the shading normal, the tangent hint
    /// comes from the surface parameterization when available.
    pub fn shading_frame(&self) -> Frame {
        Frame::from_shading(self.shading_normal, self.tangent)
    }

    /// Evaluate the hit instance's BSDF for a world-space incoming
    /// direction. Misses and instances without a BSDF evaluate to zero.
    pub fn evaluate_bsdf(&self, wi_world: Vec3) -> BsdfEval {
        let Some(bsdf) = self.instance.and_then(|i| i.bsdf()) else {
            return BsdfEval::invalid();
        };
        let frame = self.shading_frame();
        bsdf.evaluate(self.uv, frame.to_local(self.wo), frame.to_local(wi_world))
    }

    /// Sample a world-space bounce direction from the hit instance's BSDF.
    pub fn sample_bsdf(&self, rng: &mut dyn Sampler) -> Option<BsdfSample> {
        let bsdf = self.instance.and_then(|i| i.bsdf())?;
        let frame = self.shading_frame();
        let sample = bsdf.sample(self.uv, frame.to_local(self.wo), rng)?;
        Some(BsdfSample {
            wi: frame.to_world(sample.wi).normalize(),
            weight: sample.weight,
        })
    }
}

/// Equality over the geometric payload; traversal stats are diagnostics and
/// instances compare by identity.
impl PartialEq for Intersection<'_> {
    fn eq(&self, other: &Self) -> bool {
        let same_instance = match (self.instance, other.instance) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_instance
            && self.t == other.t
            && self.position == other.position
            && self.uv == other.uv
            && self.geometry_normal == other.geometry_normal
            && self.shading_normal == other.shading_normal
            && self.tangent == other.tangent
            && self.pdf == other.pdf
            && self.wo == other.wo
    }
}
