use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{channel, Receiver},
    Arc,
};

use anyhow::Context;
use glam::Vec2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use lumen::{
    color::Color,
    image::Image,
    integrator::Integrator,
    sampler::{IndependentSampler, Sampler},
    scene::Scene,
};

use crate::{
    progress::Progress,
    tile::{Tile, Tiler},
};

/// A finished tile and its pixel data, row-major within the tile.
pub struct TileMsg {
    pub tile: Tile,
    pub data: Vec<Color>,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub samples_per_pixel: u32,
    pub tile_size: u32,
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            samples_per_pixel: 64,
            tile_size: 32,
            seed: 0,
        }
    }
}

/// Drives the integrator over all pixels: tiles in parallel on rayon
/// workers, with a single writer thread folding finished tiles into the
/// image and forwarding them to the caller.
pub struct Executor {
    pub scene: Arc<Scene>,
    pub integrator: Arc<dyn Integrator>,
    pub settings: RenderSettings,
}

impl Executor {
    /// Render the full image. The cancellation flag is polled between
    /// tiles: on abort, remaining tiles are skipped and the partial image
    /// is returned.
    pub fn run<F>(&self, cancel: &AtomicBool, on_tile: F) -> anyhow::Result<Image>
    where
        F: FnMut(&TileMsg) + Send,
    {
        let resolution = self.scene.camera().resolution();
        let mut image = Image::new(resolution);

        let tiler = Tiler {
            width: resolution.x,
            height: resolution.y,
            grain: self.settings.tile_size,
        };
        let tiles = tiler.tiles();
        let progress = Progress::new(tiles.len());

        log::info!(
            "rendering {}x{} at {} spp, {} tiles",
            resolution.x,
            resolution.y,
            self.settings.samples_per_pixel,
            tiles.len()
        );

        let render_result = rayon::scope(|s| {
            let (tx, rx) = channel();

            let image = &mut image;
            let progress = &progress;
            let mut on_tile = on_tile;
            s.spawn(move |_| {
                let rx: Receiver<TileMsg> = rx;
                let mut last_update = std::time::Instant::now();
                for msg in rx.iter() {
                    for (index, (x, y)) in msg.tile.into_iter().enumerate() {
                        image.set(x, y, msg.data[index]);
                    }
                    on_tile(&msg);

                    if last_update.elapsed() >= std::time::Duration::from_millis(300) {
                        eprint!("\r{progress}");
                        last_update = std::time::Instant::now();
                    }
                }
                eprintln!("\r{progress}");
            });

            tiles
                .into_par_iter()
                .try_for_each_init(
                    || tx.clone(),
                    |tx, tile| -> anyhow::Result<()> {
                        if cancel.load(Ordering::Relaxed) {
                            progress.add(1);
                            return Ok(());
                        }
                        let data = self.render_tile(tile);
                        progress.add(1);
                        tx.send(TileMsg { tile, data })
                            .context("tile writer disappeared")
                    },
                )
        });

        if cancel.load(Ordering::Relaxed) {
            log::warn!("render cancelled, committing partial image");
        }
        render_result?;
        Ok(image)
    }

    fn render_tile(&self, tile: Tile) -> Vec<Color> {
        let resolution = self.scene.camera().resolution();
        let inv_spp = 1.0 / self.settings.samples_per_pixel as f32;

        let mut data = Vec::with_capacity(tile.len());
        for (x, y) in tile {
            let mut accumulated = Color::BLACK;
            for sample in 0..self.settings.samples_per_pixel {
                let mut sampler =
                    IndependentSampler::for_pixel_sample(self.settings.seed, x, y, sample);

                // jittered position inside the pixel, mapped to [-1,1]² with
                // +y at the top of the image
                let jitter = sampler.next2d();
                let u = (x as f32 + jitter.x) / resolution.x as f32;
                let v = (y as f32 + jitter.y) / resolution.y as f32;
                let normalized = Vec2::new(2.0 * u - 1.0, 1.0 - 2.0 * v);

                let camera_sample = self.scene.camera().sample(normalized, &mut sampler);
                accumulated += camera_sample.weight
                    * self
                        .integrator
                        .li(&self.scene, camera_sample.ray, &mut sampler);
            }
            data.push(accumulated * inv_spp);
        }
        data
    }
}
