//! Frame driver
//!
//! [`Orrery`] owns the scene and everything hanging off it and advances them
//! one frame at a time. The windowing or game loop around it is left to the
//! caller: call [`Orrery::tick`] once per frame, then draw.
//!
//! ```no_run
//! use orrery::{Orrery, SolarSystemConfig};
//!
//! # fn main() -> Result<(), orrery::OrreryError> {
//! let mut orrery = Orrery::new();
//! orrery.add_solar_system(&SolarSystemConfig::default())?;
//! for _ in 0..60 {
//!     orrery.tick()?;
//! }
//! # Ok(())
//! # }
//! ```

use log::{debug, warn};
use thiserror::Error;

use crate::{
    gfx::{
        materials::{MaterialError, MaterialLibrary},
        rendering::{collect_draws, DrawCommand, RenderEngine, RenderError, RenderStats},
        resources::TextureLoader,
        scene::{NodeId, NodeKind, Scene, SceneError},
    },
    physics::{CollisionObject, CollisionObjectId, CollisionWorld},
    simulation::{Animation, AnimationManager, SolarSystem, SolarSystemConfig},
};

#[derive(Debug, Error)]
pub enum OrreryError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("{0} is not a mesh")]
    NotAMesh(NodeId),
}

/// What happened during one [`Orrery::tick`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Textures that finished loading (or failed) during this frame
    pub textures_settled: usize,
    pub animations_run: usize,
    /// Meshes removed because their collision object was destroyed
    pub removed_meshes: Vec<NodeId>,
}

pub struct Orrery {
    scene: Scene,
    materials: MaterialLibrary,
    textures: TextureLoader,
    collisions: CollisionWorld,
    animations: AnimationManager,
    frame: u64,
}

impl Orrery {
    /// Empty orrery loading textures from disk
    pub fn new() -> Self {
        Self::with_texture_loader(TextureLoader::from_files())
    }

    pub fn with_texture_loader(textures: TextureLoader) -> Self {
        Self {
            scene: Scene::new(),
            materials: MaterialLibrary::new(),
            textures,
            collisions: CollisionWorld::new(),
            animations: AnimationManager::new(),
            frame: 0,
        }
    }

    /// Composes a solar system and attaches its animation
    ///
    /// The returned value is a copy of the attached animation, kept for its
    /// node ids.
    pub fn add_solar_system(
        &mut self,
        config: &SolarSystemConfig,
    ) -> Result<SolarSystem, OrreryError> {
        let system = SolarSystem::new(
            &mut self.scene,
            &mut self.materials,
            &mut self.textures,
            config,
        )?;
        self.attach_animation(system.clone());
        Ok(system)
    }

    pub fn attach_animation(&mut self, animation: impl Animation + 'static) {
        self.animations.attach(Box::new(animation));
    }

    /// Registers a collider for a mesh node
    pub fn add_collider(
        &mut self,
        mesh: NodeId,
        is_static: bool,
    ) -> Result<CollisionObjectId, OrreryError> {
        if !matches!(self.scene.node(mesh)?.kind, NodeKind::Mesh(_)) {
            return Err(OrreryError::NotAMesh(mesh));
        }
        Ok(self.collisions.insert(CollisionObject::new(mesh, is_static)))
    }

    /// Advances one frame
    ///
    /// 1. applies finished texture loads
    /// 2. runs every animation
    /// 3. removes colliders flagged for destruction, together with their meshes
    ///
    /// The removal queue is drained even when an animation fails; the
    /// animation error is returned afterwards.
    pub fn tick(&mut self) -> Result<FrameReport, OrreryError> {
        self.frame += 1;
        let textures_settled = self.textures.poll();
        let animated = self.animations.update(&mut self.scene);

        let mut removed_meshes = Vec::new();
        for (id, object) in self.collisions.drain_destroyed() {
            let mesh = object.mesh();
            match self.scene.remove(mesh) {
                Ok(nodes) => {
                    debug!("Removed {} with {} ({} node(s))", mesh, id, nodes.len());
                    removed_meshes.push(mesh);
                }
                Err(err) => warn!("Cannot remove mesh of destroyed {}: {}", id, err),
            }
        }

        let animations_run = animated?;
        Ok(FrameReport {
            frame: self.frame,
            textures_settled,
            animations_run,
            removed_meshes,
        })
    }

    /// Visible meshes with their world matrices and resolved materials
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        collect_draws(&self.scene, &self.materials)
    }

    /// Compiles shaders for materials added since the last call
    pub fn prepare_shaders(&mut self) -> usize {
        self.materials.init_shaders()
    }

    /// Draws the current state with `engine`
    pub fn render(&mut self, engine: &mut RenderEngine) -> Result<RenderStats, OrreryError> {
        self.prepare_shaders();
        Ok(engine.render(&self.scene, &self.materials, &self.textures)?)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    pub fn textures(&self) -> &TextureLoader {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureLoader {
        &mut self.textures
    }

    pub fn collisions(&self) -> &CollisionWorld {
        &self.collisions
    }

    pub fn collisions_mut(&mut self) -> &mut CollisionWorld {
        &mut self.collisions
    }

    pub fn animations(&self) -> &AnimationManager {
        &self.animations
    }

    pub fn animations_mut(&mut self) -> &mut AnimationManager {
        &mut self.animations
    }

    /// Frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Orrery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        resources::texture_loader::tests::MemorySource,
        scene::Node,
    };
    use cgmath::Vector3;

    fn orrery() -> (Orrery, SolarSystem) {
        let loader = TextureLoader::new(MemorySource::with(&[
            "assets/texture_sun.jpg",
            "assets/texture_earth.jpg",
        ]));
        let mut orrery = Orrery::with_texture_loader(loader);
        let system = orrery
            .add_solar_system(&SolarSystemConfig::default().with_segments(8, 8))
            .unwrap();
        (orrery, system)
    }

    #[test]
    fn test_tick_animates_and_counts_frames() {
        let (mut orrery, system) = orrery();
        for _ in 0..10 {
            orrery.tick().unwrap();
        }
        assert_eq!(orrery.frame(), 10);

        let sun = orrery.scene().node(system.sun).unwrap();
        assert!((sun.transform.rotation.y - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_paused_tick_leaves_scene_alone() {
        let (mut orrery, system) = orrery();
        orrery.animations_mut().set_paused(true);
        let report = orrery.tick().unwrap();

        assert_eq!(report.animations_run, 0);
        assert_eq!(
            orrery.scene().node(system.moon).unwrap().transform.rotation.y,
            0.0
        );
    }

    #[test]
    fn test_destroyed_collider_removes_mesh_on_next_tick() {
        let (mut orrery, system) = orrery();
        let moon = orrery.add_collider(system.moon, false).unwrap();
        let companion = orrery.add_collider(system.companion, true).unwrap();

        orrery
            .collisions_mut()
            .get_mut(moon)
            .unwrap()
            .set_on_intersect_listener(|this, hit| {
                if hit.other_is_static {
                    this.destroy();
                }
            });
        orrery
            .collisions_mut()
            .report_intersection(moon, companion)
            .unwrap();
        // Flagged only; the mesh is still drawn until the next tick
        assert!(orrery.scene().contains(system.moon));

        let report = orrery.tick().unwrap();
        assert_eq!(report.removed_meshes, vec![system.moon]);
        assert!(!orrery.scene().contains(system.moon));
        assert!(orrery.collisions().get(moon).is_none());
    }

    #[test]
    fn test_ticks_continue_after_bodies_are_removed() {
        let (mut orrery, system) = orrery();
        let earth = orrery.add_collider(system.earth, false).unwrap();
        orrery.collisions_mut().get_mut(earth).unwrap().destroy();
        assert_eq!(orrery.tick().unwrap().removed_meshes, vec![system.earth]);

        let spin = |orrery: &Orrery, id| orrery.scene().node(id).unwrap().transform.rotation.y;
        let before = spin(&orrery, system.companion);
        let report = orrery.tick().unwrap();
        assert_eq!(report.animations_run, 1);
        assert!((spin(&orrery, system.companion) - before - 0.02).abs() < 1e-6);

        // Removing the sun takes the whole system with it
        let sun = orrery.add_collider(system.sun, true).unwrap();
        orrery.collisions_mut().get_mut(sun).unwrap().destroy();
        assert_eq!(orrery.tick().unwrap().removed_meshes, vec![system.sun]);
        assert!(orrery.collisions().get(sun).is_none());
        assert!(!orrery.scene().contains(system.sun));
        assert!(!orrery.scene().contains(system.moon));

        for _ in 0..3 {
            assert!(orrery.tick().is_ok());
        }
    }

    struct Stuck(NodeId);

    impl Animation for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }

        fn animate(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
            scene.rotate(self.0, Vector3::new(0.0, 0.1, 0.0))
        }
    }

    #[test]
    fn test_failing_animation_still_drains_removals() {
        let (mut orrery, system) = orrery();
        let ghost = orrery.scene_mut().add_to_root(Node::group("Ghost"));
        orrery.scene_mut().remove(ghost).unwrap();
        orrery.attach_animation(Stuck(ghost));

        let moon = orrery.add_collider(system.moon, false).unwrap();
        orrery.collisions_mut().get_mut(moon).unwrap().destroy();

        assert!(matches!(
            orrery.tick(),
            Err(OrreryError::Scene(SceneError::UnknownNode(id))) if id == ghost
        ));
        assert!(!orrery.scene().contains(system.moon));
        assert!(orrery.collisions().is_empty());
    }

    #[test]
    fn test_add_collider_rejects_non_mesh() {
        let (mut orrery, system) = orrery();
        assert!(matches!(
            orrery.add_collider(system.earth_orbit, true),
            Err(OrreryError::NotAMesh(id)) if id == system.earth_orbit
        ));
    }

    #[test]
    fn test_draw_list_and_shaders() {
        let (mut orrery, system) = orrery();
        let draws = orrery.draw_list();
        assert_eq!(draws.len(), 4);
        assert_eq!(draws[0].node, system.sun);

        // Four added materials plus the default
        assert_eq!(orrery.prepare_shaders(), 5);
        assert_eq!(orrery.prepare_shaders(), 0);
        let earth = orrery.materials().get_material("earth").unwrap();
        assert!(earth.stage_uniforms().is_ok());
    }

    #[test]
    fn test_textures_settle_through_ticks() {
        let (mut orrery, _) = orrery();
        assert_eq!(orrery.textures().len(), 6);
        orrery.textures_mut().wait_all();
        assert_eq!(orrery.textures().pending_count(), 0);
        // Nothing left to settle once everything has been waited on
        assert_eq!(orrery.tick().unwrap().textures_settled, 0);
    }
}
