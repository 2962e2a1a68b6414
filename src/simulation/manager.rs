//! Animation manager
//!
//! Owns the attached animations and runs them once per frame.

use log::{debug, info};

use super::traits::Animation;
use crate::gfx::scene::{Scene, SceneError};

/// Runs attached animations in attachment order
#[derive(Default)]
pub struct AnimationManager {
    animations: Vec<Box<dyn Animation>>,
    is_paused: bool,
    frames: u64,
}

impl AnimationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, animation: Box<dyn Animation>) {
        info!("Attached animation '{}'", animation.name());
        self.animations.push(animation);
    }

    /// Removes the first animation called `name`
    pub fn detach(&mut self, name: &str) -> Option<Box<dyn Animation>> {
        let index = self.animations.iter().position(|a| a.name() == name)?;
        debug!("Detached animation '{}'", name);
        Some(self.animations.remove(index))
    }

    /// Advances every running animation by one frame
    ///
    /// Returns how many animations ran. Stops at the first failure; animations
    /// before it have already been applied.
    pub fn update(&mut self, scene: &mut Scene) -> Result<usize, SceneError> {
        if self.is_paused {
            return Ok(0);
        }

        let mut ran = 0;
        for animation in self.animations.iter_mut().filter(|a| a.is_running()) {
            animation.animate(scene)?;
            ran += 1;
        }
        self.frames += 1;
        Ok(ran)
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Pauses or resumes the whole manager
    ///
    /// Each animation's own running flag is left alone, so an animation that
    /// was stopped before pausing stays stopped after resuming.
    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    /// Frames advanced while not paused
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn names(&self) -> Vec<&str> {
        self.animations.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
