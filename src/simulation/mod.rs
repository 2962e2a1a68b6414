//! # Simulation Module
//!
//! Scene composition and per-frame animation.
//!
//! - [`traits::Animation`] - interface the frame driver calls every frame
//! - [`manager::AnimationManager`] - runs attached animations, pausable
//! - [`solar_system::SolarSystem`] - sun, two planets and a moon on orbit nodes

pub mod manager;
pub mod solar_system;
pub mod traits;

pub use manager::AnimationManager;
pub use solar_system::{SolarSystem, SolarSystemConfig};
pub use traits::Animation;
