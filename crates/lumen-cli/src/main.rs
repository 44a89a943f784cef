mod cli;
mod executor;
mod logger;
mod output;
mod progress;
mod scenes;
mod tile;

use std::sync::{atomic::AtomicBool, Arc};

use anyhow::Result;
use clap::Parser;
use glam::UVec2;

use lumen::{
    integrator::Integrator,
    registry::{Properties, Registry, Value},
};

use cli::{Args, AvailableIntegrator};
use executor::{Executor, RenderSettings};
use output::FileOutput;

fn build_integrator(args: &Args, registry: &Registry) -> Result<Arc<dyn Integrator>> {
    let integrator = match args.integrator {
        AvailableIntegrator::Direct => {
            registry.create_integrator("direct", &Properties::new("direct"))?
        }
        AvailableIntegrator::Pathtracer => registry.create_integrator(
            "pathtracer",
            &Properties::new("pathtracer")
                .with("depth", Value::Int(args.depth as i64))
                .with("nee", Value::Bool(!args.no_nee)),
        )?,
        AvailableIntegrator::AovNormals => registry.create_integrator(
            "aov",
            &Properties::new("aov").with("variable", Value::String("normals".into())),
        )?,
        AvailableIntegrator::AovBvh => registry.create_integrator(
            "aov",
            &Properties::new("aov")
                .with("variable", Value::String("bvh".into()))
                .with("scale", Value::Int(16)),
        )?,
    };
    Ok(integrator)
}

fn main() -> Result<()> {
    logger::init();
    let args = Args::parse();

    let registry = Registry::with_defaults();
    let resolution = UVec2::new(args.dimensions.width, args.dimensions.height);

    let scene = scenes::build(args.scene, &registry, resolution)?;
    let integrator = build_integrator(&args, &registry)?;

    let executor = Executor {
        scene: Arc::new(scene),
        integrator,
        settings: RenderSettings {
            samples_per_pixel: args.spp,
            tile_size: args.tile_size,
            seed: args.seed,
        },
    };

    // polled between tiles; partial results are still committed
    let cancel = AtomicBool::new(false);

    let image = if args.disable_threading {
        rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()?
            .install(|| executor.run(&cancel, |_| {}))?
    } else {
        executor.run(&cancel, |_| {})?
    };

    let output = FileOutput {
        directory: args.output.clone(),
    };
    output.commit("render", &image)?;

    let tonemapped = registry
        .create_postprocess("tonemap", &Properties::new("tonemap"))?
        .run(&image);
    let bloomed = registry
        .create_postprocess("bloom_minimal", &Properties::new("bloom_minimal"))?
        .run(&tonemapped);
    output.commit("render_post", &bloomed)?;

    log::info!("done");
    Ok(())
}
