//! Textures map a 2d surface coordinate to a color or a scalar. They are
//! shared immutably between threads once the scene is built.

mod checkerboard;
mod image;

pub use checkerboard::Checkerboard;
pub use image::{BorderMode, FilterMode, ImageTexture};

use glam::Vec2;

use crate::color::Color;

pub trait Texture: Send + Sync {
    fn evaluate(&self, uv: Vec2) -> Color;

    /// Scalar lookup, used for roughness/metallic/ior parameters and alpha
    /// masks. Defaults to the mean of the color value.
    fn scalar(&self, uv: Vec2) -> f32 {
        self.evaluate(uv).mean()
    }
}

/// A texture that ignores its coordinate.
pub struct ConstantTexture {
    value: Color,
}

impl ConstantTexture {
    pub fn new(value: Color) -> Self {
        Self { value }
    }

    pub fn scalar_value(value: f32) -> Self {
        Self {
            value: Color::splat(value),
        }
    }
}

impl Texture for ConstantTexture {
    fn evaluate(&self, _uv: Vec2) -> Color {
        self.value
    }
}
