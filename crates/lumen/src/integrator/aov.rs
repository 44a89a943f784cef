use crate::{color::Color, ray::Ray, sampler::Sampler, scene::Scene};

use super::Integrator;

/// Which auxiliary variable to visualize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AovVariable {
    /// Shading normals remapped from [-1,1] to RGB.
    Normals,
    /// Acceleration-structure node visits per ray, for traversal debugging.
    BvhHeatmap,
}

/// Renders debug outputs instead of radiance. Not an estimator: a single
/// sample per pixel fully determines the value (up to stochastic alpha).
pub struct AovIntegrator {
    variable: AovVariable,
    scale: f32,
}

impl AovIntegrator {
    pub fn new(variable: AovVariable, scale: f32) -> Self {
        Self {
            variable,
            scale: scale.max(1.0),
        }
    }
}

impl Integrator for AovIntegrator {
    fn li(&self, scene: &Scene, ray: Ray, rng: &mut dyn Sampler) -> Color {
        let its = scene.intersect(&ray, rng);

        match self.variable {
            AovVariable::Normals => {
                let normal = if its.is_hit() {
                    its.shading_normal
                } else {
                    glam::Vec3::ZERO
                };
                Color::from_vec((normal + glam::Vec3::ONE) / 2.0)
            }
            AovVariable::BvhHeatmap => {
                Color::splat(its.stats.bvh_nodes as f32 / self.scale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::camera::{Camera, FovAxis, Perspective};
    use crate::instance::Instance;
    use crate::math::{point::Point, transform::Transform};
    use crate::sampler::IndependentSampler;
    use crate::shape::Sphere;
    use glam::{UVec2, Vec3};

    fn sphere_scene() -> Scene {
        let camera: Arc<dyn Camera> = Arc::new(Perspective::new(
            UVec2::new(8, 8),
            Transform::IDENTITY,
            70.0,
            FovAxis::Y,
        ));
        Scene::new(
            vec![Instance::new(Arc::new(Sphere))],
            Vec::new(),
            None,
            camera,
        )
    }

    #[test]
    fn normals_are_remapped_to_rgb() {
        let scene = sphere_scene();
        let mut rng = IndependentSampler::new(0);

        let aov = AovIntegrator::new(AovVariable::Normals, 1.0);
        let front = aov.li(
            &scene,
            Ray::new(Point::new(0.0, 0.0, -3.0), Vec3::Z),
            &mut rng,
        );
        // normal (0,0,-1) maps to (0.5, 0.5, 0)
        assert!((front.vec() - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-5);

        let miss = aov.li(
            &scene,
            Ray::new(Point::new(0.0, 5.0, -3.0), Vec3::Z),
            &mut rng,
        );
        assert_eq!(miss, Color::splat(0.5));
    }

    #[test]
    fn heatmap_counts_node_visits() {
        let scene = sphere_scene();
        let mut rng = IndependentSampler::new(0);

        let aov = AovIntegrator::new(AovVariable::BvhHeatmap, 1.0);
        let hit = aov.li(
            &scene,
            Ray::new(Point::new(0.0, 0.0, -3.0), Vec3::Z),
            &mut rng,
        );
        assert!(hit.mean() >= 1.0);
    }
}
