use crate::{color::Color, image::Image};

use super::Postprocess;

/// Minimal bloom: a hard luminance bright-pass, a separable Gaussian blur,
/// and an additive recombination with the original.
pub struct BloomMinimal {
    threshold: f32,
    intensity: f32,
    radius: i32,
    sigma: f32,
}

impl BloomMinimal {
    pub fn new(threshold: f32, intensity: f32, radius: i32, sigma: f32) -> Self {
        Self {
            threshold,
            intensity,
            radius: radius.max(0),
            sigma,
        }
    }

    fn gaussian_weights(&self) -> Vec<f32> {
        let mut weights = Vec::with_capacity(2 * self.radius as usize + 1);
        let mut sum = 0.0;
        for i in -self.radius..=self.radius {
            let x = i as f32;
            let w = (-(x * x) / (2.0 * self.sigma * self.sigma)).exp();
            weights.push(w);
            sum += w;
        }
        for w in &mut weights {
            *w /= sum;
        }
        weights
    }
}

impl Default for BloomMinimal {
    fn default() -> Self {
        Self::new(1.0, 0.08, 7, 4.0)
    }
}

fn tap_clamped(image: &Image, x: i64, y: i64) -> Color {
    let x = x.clamp(0, image.width() as i64 - 1) as u32;
    let y = y.clamp(0, image.height() as i64 - 1) as u32;
    image.texel(x, y)
}

impl Postprocess for BloomMinimal {
    fn run(&self, input: &Image) -> Image {
        let resolution = input.resolution();
        let weights = self.gaussian_weights();

        // 1) bright pass
        let mut bright = Image::new(resolution);
        for y in 0..resolution.y {
            for x in 0..resolution.x {
                let c = input.texel(x, y);
                if c.luminance() > self.threshold {
                    bright.set(x, y, c);
                }
            }
        }

        // 2) separable blur, horizontal into a scratch buffer then vertical
        // back into the bright buffer
        let mut scratch = Image::new(resolution);
        for y in 0..resolution.y {
            for x in 0..resolution.x {
                let mut acc = Color::BLACK;
                for i in -self.radius..=self.radius {
                    acc += weights[(i + self.radius) as usize]
                        * tap_clamped(&bright, x as i64 + i as i64, y as i64);
                }
                scratch.set(x, y, acc);
            }
        }
        for y in 0..resolution.y {
            for x in 0..resolution.x {
                let mut acc = Color::BLACK;
                for i in -self.radius..=self.radius {
                    acc += weights[(i + self.radius) as usize]
                        * tap_clamped(&scratch, x as i64, y as i64 + i as i64);
                }
                bright.set(x, y, acc);
            }
        }

        // 3) combine
        let mut output = Image::new(resolution);
        for y in 0..resolution.y {
            for x in 0..resolution.x {
                output.set(x, y, input.texel(x, y) + self.intensity * bright.texel(x, y));
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
    fn dim_images_pass_through_unchanged() {
        let mut input = Image::new(UVec2::new(8, 8));
        for y in 0..8 {
            for x in 0..8 {
                input.set(x, y, Color::splat(0.25));
            }
        }

        let out = BloomMinimal::default().run(&input);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.texel(x, y), Color::splat(0.25));
            }
        }
    }

    #[test]
    fn bright_pixels_bleed_into_neighbors() {
        let mut input = Image::new(UVec2::new(17, 17));
        input.set(8, 8, Color::splat(100.0));

        let out = BloomMinimal::new(1.0, 0.1, 4, 2.0).run(&input);
        // the hot pixel keeps its energy plus its own bloom
        assert!(out.texel(8, 8).mean() > 100.0);
        // neighbors that were black now glow
        assert!(out.texel(10, 8).mean() > 0.0);
        assert!(out.texel(8, 11).mean() > 0.0);
        // far corners stay black (outside the blur radius)
        assert_eq!(out.texel(0, 0), Color::BLACK);
    }

    #[test]
    fn blur_preserves_energy_of_the_bright_pass() {
        let mut input = Image::new(UVec2::new(33, 33));
        input.set(16, 16, Color::splat(10.0));

        let bloom = BloomMinimal::new(1.0, 1.0, 5, 2.0);
        let out = bloom.run(&input);

        let total_in: f32 = input.pixels().iter().map(|c| c.mean()).sum();
        let total_out: f32 = out.pixels().iter().map(|c| c.mean()).sum();
        // output = input + 1.0 * blurred(bright); the blur is normalized so
        // the added energy equals the bright-pass energy
        assert!((total_out - 2.0 * total_in).abs() < 1e-3);
    }
}
