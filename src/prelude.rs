//! # Orrery Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use orrery::prelude::*;
//!
//! struct Wobble(NodeId);
//!
//! impl Animation for Wobble {
//!     fn name(&self) -> &str {
//!         "wobble"
//!     }
//!
//!     fn animate(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
//!         scene.rotate(self.0, Vector3::new(0.01, 0.0, 0.0))
//!     }
//! }
//!
//! fn main() -> Result<(), OrreryError> {
//!     let mut orrery = orrery::default()?;
//!     let sun = orrery.scene().find_by_name("Sun").unwrap();
//!     orrery.attach_animation(Wobble(sun));
//!     orrery.tick()?;
//!     Ok(())
//! }
//! ```

// Re-export core application types
pub use crate::app::{FrameReport, Orrery, OrreryError};
pub use crate::default;

// Re-export scene and graphics types
pub use crate::gfx::geometry::{GeometryData, SphereGeometry};
pub use crate::gfx::materials::{
    BasicMaterial, BasicMaterialOptions, Material, MaterialError, MaterialLibrary, PhongMaterial,
    PhongMaterialOptions,
};
pub use crate::gfx::resources::{TextureHandle, TextureLoader, TextureState};
pub use crate::gfx::scene::{
    AmbientLight, Mesh, Node, NodeId, NodeKind, PointLight, Scene, SceneError,
};
pub use crate::gfx::{OrbitCamera, RenderEngine};

// Re-export physics
pub use crate::physics::{CollisionObject, CollisionObjectId, CollisionWorld, Intersection};

// Re-export simulation framework
pub use crate::simulation::{Animation, AnimationManager, SolarSystem, SolarSystemConfig};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
