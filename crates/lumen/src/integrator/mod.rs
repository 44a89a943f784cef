//! Radiance estimators. An integrator turns one primary ray into one
//! radiance estimate; the driver loops over pixels and samples.

mod aov;
mod direct;
mod pathtracer;

pub use aov::{AovIntegrator, AovVariable};
pub use direct::DirectIntegrator;
pub use pathtracer::PathTracer;

use crate::{color::Color, ray::Ray, sampler::Sampler, scene::Scene};

pub trait Integrator: Send + Sync {
    /// Estimate the radiance arriving along `ray`. The estimate is unbiased
    /// (or consistently biased, e.g. by the path depth cutoff); averaging
    /// over samples converges to the true value.
    fn li(&self, scene: &Scene, ray: Ray, rng: &mut dyn Sampler) -> Color;
}
