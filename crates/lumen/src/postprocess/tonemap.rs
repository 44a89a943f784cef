use crate::{color::Color, image::Image};

use super::Postprocess;

/// Reinhard-style tone mapping, `c / (c + 1)` per channel: compresses
/// unbounded radiance into [0, 1) while leaving dark values nearly linear.
pub struct Tonemap;

impl Postprocess for Tonemap {
    fn run(&self, input: &Image) -> Image {
        let mut output = Image::new(input.resolution());
        for y in 0..input.height() {
            for x in 0..input.width() {
                let c = input.texel(x, y);
                output.set(x, y, c / (c + Color::WHITE));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    #[test]
    fn compresses_into_the_unit_range() {
        let mut input = Image::new(UVec2::new(2, 1));
        input.set(0, 0, Color::splat(3.0));
        input.set(1, 0, Color::new(0.0, 1.0, 9.0));

        let out = Tonemap.run(&input);
        assert!((out.texel(0, 0).mean() - 0.75).abs() < 1e-6);
        let px = out.texel(1, 0);
        assert_eq!(px.r(), 0.0);
        assert!((px.g() - 0.5).abs() < 1e-6);
        assert!((px.b() - 0.9).abs() < 1e-6);
    }
}
