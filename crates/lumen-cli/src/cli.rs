use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once('x')
            .ok_or_else(|| format!("expected `width`x`height`, got {s}"))?;
        Ok(Self {
            width: width.parse().map_err(|e| format!("bad width: {e}"))?,
            height: height.parse().map_err(|e| format!("bad height: {e}"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum AvailableScene {
    /// Diffuse, metal and principled spheres on a checkerboard ground.
    #[default]
    Spheres,
    /// An emissive ceiling panel in a closed box.
    Cornell,
    /// A glass sphere over a checkerboard under a white sky.
    Dielectric,
    /// A homogeneous scattering cube under a white sky.
    Volume,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum AvailableIntegrator {
    Direct,
    #[default]
    Pathtracer,
    AovNormals,
    AovBvh,
}

#[derive(Parser, Debug)]
#[command(name = "lumen", about = "A small Monte Carlo renderer")]
pub struct Args {
    /// Scene selector
    #[arg(long, value_enum, default_value_t)]
    pub scene: AvailableScene,

    /// Integrator selector
    #[arg(short, long, value_enum, default_value_t)]
    pub integrator: AvailableIntegrator,

    /// Samples per pixel
    #[arg(long, default_value_t = 64)]
    pub spp: u32,

    /// Image dimensions in format `width`x`height`
    #[arg(short, long, default_value = "512x512")]
    pub dimensions: Dimensions,

    /// Maximum path depth (pathtracer only)
    #[arg(long, default_value_t = 8)]
    pub depth: u32,

    /// Disable next-event estimation (pathtracer only)
    #[arg(long)]
    pub no_nee: bool,

    /// Edge length of the square render tiles
    #[arg(long, default_value_t = 32)]
    pub tile_size: u32,

    /// Random seed; identical seeds reproduce identical images
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Render on a single thread
    #[arg(long)]
    pub disable_threading: bool,
}
