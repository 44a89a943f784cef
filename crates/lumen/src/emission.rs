use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::{color::Color, math::frame::Frame, texture::Texture};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionEval {
    pub value: Color,
}

/// Radiance emitted from a surface point into a local outgoing direction.
pub trait Emission: Send + Sync {
    fn evaluate(&self, uv: Vec2, wo: Vec3) -> EmissionEval;
}

/// Emits a texture-driven radiance uniformly over the front hemisphere and
/// nothing on the back side.
pub struct Lambertian {
    emission: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(emission: Arc<dyn Texture>) -> Self {
        Self { emission }
    }
}

impl Emission for Lambertian {
    fn evaluate(&self, uv: Vec2, wo: Vec3) -> EmissionEval {
        if Frame::cos_theta(wo) <= 0.0 {
            return EmissionEval {
                value: Color::BLACK,
            };
        }
        EmissionEval {
            value: self.emission.evaluate(uv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::ConstantTexture;

    #[test]
    fn emits_only_on_the_front_side() {
        let emitter = Lambertian::new(Arc::new(ConstantTexture::new(Color::splat(5.0))));
        let front = emitter.evaluate(Vec2::ZERO, Vec3::new(0.1, 0.2, 0.9).normalize());
        let back = emitter.evaluate(Vec2::ZERO, Vec3::new(0.1, 0.2, -0.9).normalize());

        assert_eq!(front.value, Color::splat(5.0));
        assert!(back.value.is_black());
    }
}
