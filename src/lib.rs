// src/lib.rs
//! Orrery
//!
//! A small solar system on a scene graph: orbit nodes, Phong materials with
//! asynchronously loaded textures, collision bookkeeping and a headless wgpu
//! renderer.

pub mod app;
pub mod gfx;
pub mod physics;
pub mod prelude;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{FrameReport, Orrery, OrreryError};
pub use simulation::{SolarSystem, SolarSystemConfig};

/// Creates an orrery holding the default solar system, textures loading from disk
pub fn default() -> Result<Orrery, OrreryError> {
    let mut orrery = Orrery::new();
    orrery.add_solar_system(&SolarSystemConfig::default())?;
    Ok(orrery)
}
