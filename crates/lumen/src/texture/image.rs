use std::sync::Arc;

use glam::Vec2;

use crate::{color::Color, image::Image};

use super::Texture;

/// How integer texel coordinates outside the image are brought back in
/// range. Border handling happens after rounding to integer pixels, not on
/// the continuous uv coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    Clamp,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Bilinear,
}

/// An image-backed texture with border and filter modes.
///
/// The pixel-center convention is that uv (0.5/W, 0.5/H) samples the center
/// of the top-left texel; the v axis is flipped so v = 1 is the top row.
pub struct ImageTexture {
    image: Arc<Image>,
    exposure: f32,
    border: BorderMode,
    filter: FilterMode,
}

impl ImageTexture {
    pub fn new(image: Arc<Image>, exposure: f32, border: BorderMode, filter: FilterMode) -> Self {
        Self {
            image,
            exposure,
            border,
            filter,
        }
    }

    fn resolve(&self, coord: i64, size: u32) -> u32 {
        match self.border {
            BorderMode::Clamp => coord.clamp(0, size as i64 - 1) as u32,
            BorderMode::Repeat => coord.rem_euclid(size as i64) as u32,
        }
    }

    fn tap(&self, x: i64, y: i64) -> Color {
        let x = self.resolve(x, self.image.width());
        let y = self.resolve(y, self.image.height());
        self.image.texel(x, y)
    }

    fn sample_nearest(&self, x: f32, y: f32) -> Color {
        self.tap(x.round() as i64, y.round() as i64)
    }

    fn sample_bilinear(&self, x: f32, y: f32) -> Color {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let tx = x - x.floor();
        let ty = y - y.floor();

        let t00 = self.tap(x0, y0);
        let t10 = self.tap(x0 + 1, y0);
        let t01 = self.tap(x0, y0 + 1);
        let t11 = self.tap(x0 + 1, y0 + 1);

        let top = tx * t10 + (1.0 - tx) * t00;
        let bottom = tx * t11 + (1.0 - tx) * t01;
        ty * bottom + (1.0 - ty) * top
    }
}

impl Texture for ImageTexture {
    fn evaluate(&self, uv: Vec2) -> Color {
        let x = uv.x * self.image.width() as f32 - 0.5;
        let y = (1.0 - uv.y) * self.image.height() as f32 - 0.5;

        let value = match self.filter {
            FilterMode::Nearest => self.sample_nearest(x, y),
            FilterMode::Bilinear => self.sample_bilinear(x, y),
        };
        value * self.exposure
    }

    /// The alpha channel of the backing image, bilinearly interpolated and
    /// clamped to [0,1]. RGB-only sources load with alpha 1.
    fn scalar(&self, uv: Vec2) -> f32 {
        self.image.evaluate_alpha(uv).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    fn two_by_two() -> Arc<Image> {
        let mut image = Image::new(UVec2::new(2, 2));
        // top-left red, top-right green, bottom-left blue, bottom-right white
        image.set(0, 0, Color::new(1.0, 0.0, 0.0));
        image.set(1, 0, Color::new(0.0, 1.0, 0.0));
        image.set(0, 1, Color::new(0.0, 0.0, 1.0));
        image.set(1, 1, Color::WHITE);
        Arc::new(image)
    }

    #[test]
    fn pixel_centers_hit_exact_texels() {
        let t = ImageTexture::new(two_by_two(), 1.0, BorderMode::Repeat, FilterMode::Bilinear);
        // uv (0.25, 0.75) is the center of the top-left texel
        assert_eq!(t.evaluate(Vec2::new(0.25, 0.75)), Color::new(1.0, 0.0, 0.0));
        assert_eq!(t.evaluate(Vec2::new(0.75, 0.25)), Color::WHITE);
    }

    #[test]
    fn bilinear_blends_between_texels() {
        let t = ImageTexture::new(two_by_two(), 1.0, BorderMode::Clamp, FilterMode::Bilinear);
        // halfway between top-left (red) and top-right (green)
        let c = t.evaluate(Vec2::new(0.5, 0.75));
        assert!((c.r() - 0.5).abs() < 1e-5);
        assert!((c.g() - 0.5).abs() < 1e-5);
        assert!(c.b().abs() < 1e-5);
    }

    #[test]
    fn nearest_rounds_to_the_closest_texel() {
        let t = ImageTexture::new(two_by_two(), 1.0, BorderMode::Clamp, FilterMode::Nearest);
        assert_eq!(t.evaluate(Vec2::new(0.4, 0.9)), Color::new(1.0, 0.0, 0.0));
        assert_eq!(t.evaluate(Vec2::new(0.6, 0.9)), Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn exposure_scales_the_result() {
        let t = ImageTexture::new(two_by_two(), 2.0, BorderMode::Clamp, FilterMode::Nearest);
        assert_eq!(t.evaluate(Vec2::new(0.25, 0.75)), Color::new(2.0, 0.0, 0.0));
    }
}
