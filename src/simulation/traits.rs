//! Per-frame animation interface
//!
//! Anything that mutates the scene once per frame implements [`Animation`]
//! and is handed to the [`Orrery`](crate::app::Orrery) frame driver.

use crate::gfx::scene::{Scene, SceneError};

/// Scene-mutating behaviour driven once per frame
pub trait Animation {
    /// Name for logging
    fn name(&self) -> &str;

    /// Advances the animation by one frame
    ///
    /// Fails when a node the animation drives is no longer in `scene`.
    fn animate(&mut self, scene: &mut Scene) -> Result<(), SceneError>;

    /// Whether the frame driver should call [`Animation::animate`]
    fn is_running(&self) -> bool {
        true
    }

    /// Start/pause the animation
    fn set_running(&mut self, _running: bool) {}
}
