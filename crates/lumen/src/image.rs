//! The HDR image buffer shared by texturing, rendering and post-processing.
//!
//! Images store linear RGB plus a separate alpha plane (used by alpha-masked
//! instances). EXR files are read and written through the `exr` crate; LDR
//! formats go through the `image` crate and are gamma-corrected to linear
//! unless declared linear by the caller.

use std::path::Path;

use glam::{UVec2, Vec2};

use crate::{color::Color, error::Error, Result};

/// Gamma applied when promoting LDR inputs to linear radiance.
const LDR_GAMMA: f32 = 2.2;

pub struct Image {
    resolution: UVec2,
    data: Vec<Color>,
    alpha: Vec<f32>,
}

impl Image {
    /// A black, fully opaque image.
    pub fn new(resolution: UVec2) -> Self {
        let len = (resolution.x * resolution.y) as usize;
        Self {
            resolution,
            data: vec![Color::BLACK; len],
            alpha: vec![1.0; len],
        }
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn width(&self) -> u32 {
        self.resolution.x
    }

    pub fn height(&self) -> u32 {
        self.resolution.y
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.resolution.x && y < self.resolution.y);
        (y * self.resolution.x + x) as usize
    }

    pub fn texel(&self, x: u32, y: u32) -> Color {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: Color) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    /// Bilinearly interpolated alpha with repeat wrapping, following the same
    /// pixel-center convention as image textures (v flipped, centers at
    /// half-texel offsets).
    pub fn evaluate_alpha(&self, uv: Vec2) -> f32 {
        let w = self.resolution.x as i64;
        let h = self.resolution.y as i64;

        let x = uv.x * w as f32 - 0.5;
        let y = (1.0 - uv.y) * h as f32 - 0.5;

        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let tx = x - x.floor();
        let ty = y - y.floor();

        let tap = |px: i64, py: i64| -> f32 {
            let px = px.rem_euclid(w) as u32;
            let py = py.rem_euclid(h) as u32;
            self.alpha[(py * self.resolution.x + px) as usize]
        };

        let a00 = tap(x0, y0);
        let a10 = tap(x0 + 1, y0);
        let a01 = tap(x0, y0 + 1);
        let a11 = tap(x0 + 1, y0 + 1);

        (1.0 - ty) * ((1.0 - tx) * a00 + tx * a10) + ty * ((1.0 - tx) * a01 + tx * a11)
    }

    /// Load an image from disk. EXR content is taken as-is; anything else is
    /// decoded by the `image` crate and promoted from gamma 2.2 to linear
    /// unless `is_linear` is set. The alpha plane comes from the file's
    /// fourth channel, defaulting to 1.
    pub fn load(path: &Path, is_linear: bool) -> Result<Self> {
        log::info!("loading image {}", path.display());

        if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("exr")) {
            return Self::load_exr(path);
        }

        let decoded = image::open(path)
            .map_err(|e| Error::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgba32f();

        let resolution = UVec2::new(decoded.width(), decoded.height());
        let mut result = Self::new(resolution);
        for (i, pixel) in decoded.pixels().enumerate() {
            let [r, g, b, a] = pixel.0;
            result.data[i] = if is_linear {
                Color::new(r, g, b)
            } else {
                Color::new(r.powf(LDR_GAMMA), g.powf(LDR_GAMMA), b.powf(LDR_GAMMA))
            };
            result.alpha[i] = a;
        }
        Ok(result)
    }

    fn load_exr(path: &Path) -> Result<Self> {
        struct Storage {
            resolution: UVec2,
            data: Vec<Color>,
            alpha: Vec<f32>,
        }

        let read = exr::prelude::read_first_rgba_layer_from_file(
            path,
            |resolution, _channels| {
                let len = resolution.width() * resolution.height();
                Storage {
                    resolution: UVec2::new(resolution.width() as u32, resolution.height() as u32),
                    data: vec![Color::BLACK; len],
                    alpha: vec![1.0; len],
                }
            },
            |storage: &mut Storage, position, (r, g, b, a): (f32, f32, f32, f32)| {
                let index = position.y() * storage.resolution.x as usize + position.x();
                storage.data[index] = Color::new(r, g, b);
                storage.alpha[index] = a;
            },
        )
        .map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let storage = read.layer_data.channel_data.pixels;
        Ok(Self {
            resolution: storage.resolution,
            data: storage.data,
            alpha: storage.alpha,
        })
    }

    /// Write a linear HDR EXR. Channels are stored under their canonical
    /// names B, G, R (EXR sorts channels alphabetically, which is exactly the
    /// BGR order most viewers expect), and the textual run log is attached as
    /// a custom `log` attribute.
    pub fn save_exr(&self, path: &Path, run_log: &str) -> Result<()> {
        use exr::image::write::WritableImage;
        use exr::image::{AnyChannel, AnyChannels, Encoding, FlatSamples, Layer};
        use exr::meta::attribute::{AttributeValue, Text};

        log::info!("saving image {}", path.display());

        let len = self.data.len();
        let mut r = Vec::with_capacity(len);
        let mut g = Vec::with_capacity(len);
        let mut b = Vec::with_capacity(len);
        for pixel in &self.data {
            r.push(pixel.r());
            g.push(pixel.g());
            b.push(pixel.b());
        }

        let channels = AnyChannels::sort(smallvec::smallvec![
            AnyChannel::new("B", FlatSamples::F32(b)),
            AnyChannel::new("G", FlatSamples::F32(g)),
            AnyChannel::new("R", FlatSamples::F32(r)),
        ]);

        let layer = Layer::new(
            (self.resolution.x as usize, self.resolution.y as usize),
            exr::meta::header::LayerAttributes::default(),
            Encoding::SMALL_LOSSLESS,
            channels,
        );

        let mut image = exr::image::Image::from_layer(layer);
        if let Some(text) = Text::new_or_none(run_log) {
            image
                .attributes
                .other
                .insert(Text::new_or_panic("log"), AttributeValue::Text(text));
        }

        image.write().to_file(path).map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_interpolation_is_bilinear() {
        let mut image = Image::new(UVec2::new(2, 2));
        // top row transparent, bottom row opaque
        image.alpha = vec![0.0, 0.0, 1.0, 1.0];

        // uv (0.5, 0.5) lands exactly between the rows
        let mid = image.evaluate_alpha(Vec2::new(0.5, 0.5));
        assert!((mid - 0.5).abs() < 1e-5);

        // center of the top-left texel (v near 1 is the top)
        let top = image.evaluate_alpha(Vec2::new(0.25, 0.75));
        assert!(top.abs() < 1e-5);
    }
}
