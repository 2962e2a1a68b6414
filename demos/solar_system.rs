//! Headless solar system
//!
//! Composes the default solar system, animates it for a few seconds worth of
//! frames and, when a GPU adapter is available, renders every frame offscreen
//! and saves the last one.
//!
//! ```text
//! RUST_LOG=info cargo run --example solar_system -- [asset-dir] [frames] [output.png]
//! ```

use anyhow::{Context, Result};
use log::{info, warn};
use orrery::prelude::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let asset_dir = args.next().unwrap_or_else(|| "assets".to_string());
    let frames: u64 = match args.next() {
        Some(frames) => frames.parse().context("frame count must be a number")?,
        None => 600,
    };
    let output = args.next().unwrap_or_else(|| "solar_system.png".to_string());

    let mut orrery = Orrery::new();
    let system = orrery.add_solar_system(&SolarSystemConfig::default().with_asset_dir(&asset_dir))?;

    let mut engine = match futures::executor::block_on(RenderEngine::new_headless(1280, 720)) {
        Ok(engine) => Some(engine),
        Err(err) => {
            warn!("Rendering disabled: {}", err);
            None
        }
    };

    for _ in 0..frames {
        let report = orrery.tick()?;
        if let Some(engine) = engine.as_mut() {
            orrery.render(engine)?;
        }

        if report.frame % 60 == 0 {
            let earth = orrery.scene().world_position(system.earth)?;
            let moon = orrery.scene().world_position(system.moon)?;
            info!(
                "frame {:>4}: earth ({:>6.2}, {:>6.2}), moon ({:>6.2}, {:>6.2}), {} pending",
                report.frame,
                earth.x,
                earth.z,
                moon.x,
                moon.z,
                orrery.textures().pending_count()
            );
        }
    }

    for handle in orrery.textures().handles() {
        if let Some(TextureState::Failed(err)) = orrery.textures().state(handle) {
            warn!("{}", err);
        }
    }

    if let Some(engine) = engine {
        let frame = engine.read_frame()?;
        image::save_buffer(
            &output,
            &frame.rgba,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .with_context(|| format!("failed to write {}", output))?;
        info!("Saved last frame to {}", output);
    }

    let stats = orrery.scene().statistics();
    info!(
        "{} nodes ({} meshes, {} orbits, {} lights), {} vertices",
        stats.node_count,
        stats.mesh_count,
        stats.orbit_count,
        stats.light_count,
        stats.total_vertices
    );
    Ok(())
}
