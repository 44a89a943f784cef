use std::path::PathBuf;

use anyhow::{Context, Result};
use lumen::image::Image;

use crate::logger;

/// Writes the finished buffers to disk: linear EXR with the run log
/// attached, plus an 8-bit PNG preview for quick inspection.
pub struct FileOutput {
    pub directory: PathBuf,
}

impl FileOutput {
    pub fn commit(&self, name: &str, image: &Image) -> Result<()> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("creating {}", self.directory.display()))?;

        let exr_path = self.directory.join(format!("{name}.exr"));
        image.save_exr(&exr_path, &logger::history())?;

        let png_path = self.directory.join(format!("{name}.png"));
        let preview = image::ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            let pixel = image.texel(x, y);
            let to_byte = |linear: f32| -> u8 {
                (linear.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0 + 0.5) as u8
            };
            image::Rgb([to_byte(pixel.r()), to_byte(pixel.g()), to_byte(pixel.b())])
        });
        preview
            .save(&png_path)
            .with_context(|| format!("saving {}", png_path.display()))?;

        log::info!("wrote {} and {}", exr_path.display(), png_path.display());
        Ok(())
    }
}
