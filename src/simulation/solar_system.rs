//! Sun, two planets and a moon composed from orbit nodes
//!
//! ```text
//! Scene
//! ├── Sun (mesh)
//! │   ├── Earth Orbit ── Earth (x = +15)
//! │   ├── Companion Orbit ── Companion (x = -15)
//! │   │                      └── Moon Orbit ── Moon (x = +5)
//! │   └── Sun Light (point)
//! └── Ambient Light
//! ```
//!
//! Every orbiting body hangs from its own orbit node instead of directly from
//! the body it circles. Rotating the orbit node revolves the body; rotating the
//! body spins it in place. The two compose without interfering.

use std::path::{Path, PathBuf};

use cgmath::Vector3;
use log::{debug, info};

use super::traits::Animation;
use crate::gfx::{
    geometry::SphereGeometry,
    materials::{
        BasicMaterial, BasicMaterialOptions, MaterialId, MaterialLibrary, PhongMaterial,
        PhongMaterialOptions,
    },
    resources::TextureLoader,
    scene::{AmbientLight, Mesh, Node, NodeId, NodeKind, PointLight, Scene, SceneError},
};

/// Per-frame rotation of the sun about its own axis
pub const SUN_SPIN: Vector3<f32> = Vector3::new(0.0, 0.005, 0.0);
/// Per-frame revolution of both planets' orbit nodes
pub const PLANET_ORBIT: Vector3<f32> = Vector3::new(0.0, 0.01, 0.0);
/// Per-frame rotation of both planets about their own axes
pub const PLANET_SPIN: Vector3<f32> = Vector3::new(0.0, 0.02, 0.0);
/// Per-frame rotation of the moon about its own axis
pub const MOON_SPIN: Vector3<f32> = Vector3::new(0.0, -0.2, 0.0);

/// Sizes, distances, assets and lights of the solar system
#[derive(Debug, Clone, PartialEq)]
pub struct SolarSystemConfig {
    pub sun_radius: f32,
    pub planet_radius: f32,
    pub moon_radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Offset of the earth from its orbit node along X
    pub earth_distance: f32,
    /// Offset of the companion planet from its orbit node along X
    pub companion_distance: f32,
    /// Offset of the moon from its orbit node along X
    pub moon_distance: f32,
    pub sun_texture: PathBuf,
    /// Packed `0xRRGGBB` tint multiplied over the sun texture
    pub sun_tint: u32,
    pub earth_texture: PathBuf,
    pub companion_texture: PathBuf,
    pub moon_texture: PathBuf,
    pub specular_map: PathBuf,
    pub normal_map: PathBuf,
    pub planet_shininess: f32,
    pub sun_light: PointLight,
    pub ambient_light: AmbientLight,
}

impl Default for SolarSystemConfig {
    fn default() -> Self {
        Self {
            sun_radius: 5.0,
            planet_radius: 2.5,
            moon_radius: 1.0,
            width_segments: 64,
            height_segments: 64,
            earth_distance: 15.0,
            companion_distance: -15.0,
            moon_distance: 5.0,
            sun_texture: PathBuf::from("assets/texture_sun.jpg"),
            sun_tint: 0xff0000,
            earth_texture: PathBuf::from("assets/texture_earth.jpg"),
            companion_texture: PathBuf::from("assets/texture_companion.jpg"),
            moon_texture: PathBuf::from("assets/texture_moon.png"),
            specular_map: PathBuf::from("assets/earthspec1k.jpg"),
            normal_map: PathBuf::from("assets/2k_earth_normal_map.png"),
            planet_shininess: 1.0,
            sun_light: PointLight::new(0xffffff, 3.0),
            ambient_light: AmbientLight::new(0xffffff, 0.4),
        }
    }
}

impl SolarSystemConfig {
    /// Builder pattern: resolve every asset path against `dir`
    pub fn with_asset_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        for path in [
            &mut self.sun_texture,
            &mut self.earth_texture,
            &mut self.companion_texture,
            &mut self.moon_texture,
            &mut self.specular_map,
            &mut self.normal_map,
        ] {
            if let Some(file_name) = path.file_name() {
                *path = dir.join(file_name);
            }
        }
        self
    }

    /// Builder pattern: sphere tessellation for every body
    pub fn with_segments(mut self, width: u32, height: u32) -> Self {
        self.width_segments = width;
        self.height_segments = height;
        self
    }

    /// Builder pattern: point light attached to the sun
    pub fn with_sun_light(mut self, light: PointLight) -> Self {
        self.sun_light = light;
        self
    }

    /// Builder pattern: constant background light
    pub fn with_ambient_light(mut self, light: AmbientLight) -> Self {
        self.ambient_light = light;
        self
    }
}

/// The composed solar system and its per-frame rotation table
#[derive(Debug, Clone)]
pub struct SolarSystem {
    pub sun: NodeId,
    pub earth_orbit: NodeId,
    pub earth: NodeId,
    pub companion_orbit: NodeId,
    pub companion: NodeId,
    pub moon_orbit: NodeId,
    pub moon: NodeId,
    pub sun_light: NodeId,
    pub ambient_light: NodeId,
    rotations: Vec<(NodeId, Vector3<f32>)>,
    running: bool,
}

impl SolarSystem {
    /// Builds the hierarchy under the scene root
    ///
    /// Texture loads are started here and not awaited; materials reference
    /// the pending handles and pick the pixels up once they are ready.
    pub fn new(
        scene: &mut Scene,
        materials: &mut MaterialLibrary,
        textures: &mut TextureLoader,
        config: &SolarSystemConfig,
    ) -> Result<Self, SceneError> {
        let segments = (config.width_segments, config.height_segments);

        let sun_material = materials.add_material(BasicMaterial::new(
            "sun",
            BasicMaterialOptions::default()
                .with_hex_color(config.sun_tint)
                .with_map(textures.load(&config.sun_texture)),
        ));
        let sun = scene.add(
            scene.root(),
            Self::create_planet_mesh("Sun", &sun_material, config.sun_radius, segments),
        )?;

        let earth_material = Self::create_material(
            materials,
            textures,
            "earth",
            &config.earth_texture,
            &config.specular_map,
            &config.normal_map,
            config.planet_shininess,
        );
        let earth_orbit = scene.add(sun, Self::create_orbit_node("Earth Orbit"))?;
        let earth = scene.add(
            earth_orbit,
            Self::create_planet_mesh("Earth", &earth_material, config.planet_radius, segments)
                .with_position(Vector3::new(config.earth_distance, 0.0, 0.0)),
        )?;

        let companion_material = Self::create_material(
            materials,
            textures,
            "companion",
            &config.companion_texture,
            &config.specular_map,
            &config.normal_map,
            config.planet_shininess,
        );
        let companion_orbit = scene.add(sun, Self::create_orbit_node("Companion Orbit"))?;
        let companion = scene.add(
            companion_orbit,
            Self::create_planet_mesh(
                "Companion",
                &companion_material,
                config.planet_radius,
                segments,
            )
            .with_position(Vector3::new(config.companion_distance, 0.0, 0.0)),
        )?;

        let moon_material = Self::create_material(
            materials,
            textures,
            "moon",
            &config.moon_texture,
            &config.specular_map,
            &config.normal_map,
            config.planet_shininess,
        );
        let moon_orbit = scene.add(companion, Self::create_orbit_node("Moon Orbit"))?;
        let moon = scene.add(
            moon_orbit,
            Self::create_planet_mesh("Moon", &moon_material, config.moon_radius, segments)
                .with_position(Vector3::new(config.moon_distance, 0.0, 0.0)),
        )?;

        let sun_light = scene.add(
            sun,
            Node::new("Sun Light", NodeKind::PointLight(config.sun_light)),
        )?;
        let ambient_light = scene.add(
            scene.root(),
            Node::new("Ambient Light", NodeKind::AmbientLight(config.ambient_light)),
        )?;

        // The moon orbit node is deliberately absent: the moon only spins
        let rotations = vec![
            (sun, SUN_SPIN),
            (earth_orbit, PLANET_ORBIT),
            (earth, PLANET_SPIN),
            (companion_orbit, PLANET_ORBIT),
            (companion, PLANET_SPIN),
            (moon, MOON_SPIN),
        ];

        info!(
            "Composed solar system: {} nodes, {} textures loading",
            scene.len(),
            textures.pending_count()
        );

        Ok(Self {
            sun,
            earth_orbit,
            earth,
            companion_orbit,
            companion,
            moon_orbit,
            moon,
            sun_light,
            ambient_light,
            rotations,
            running: true,
        })
    }

    /// Invisible anchor whose rotation carries an orbit
    pub fn create_orbit_node(name: &str) -> Node {
        Node::orbit(name)
    }

    /// Lit Phong material bound to diffuse, specular and normal maps
    ///
    /// Returns at once; the three textures load in the background.
    pub fn create_material(
        materials: &mut MaterialLibrary,
        textures: &mut TextureLoader,
        name: &str,
        texture: &Path,
        specular_map: &Path,
        normal_map: &Path,
        shininess: f32,
    ) -> MaterialId {
        let options = PhongMaterialOptions::default()
            .with_map(textures.load(texture))
            .with_specular_map(textures.load(specular_map))
            .with_normal_map(textures.load(normal_map))
            .with_shininess(shininess);

        debug!("Creating material '{}' from '{}'", name, texture.display());
        materials.add_material(PhongMaterial::new(name, options))
    }

    /// Sphere mesh node referencing `material`
    pub fn create_planet_mesh(
        name: &str,
        material: &str,
        radius: f32,
        (width_segments, height_segments): (u32, u32),
    ) -> Node {
        Node::mesh(
            name,
            Mesh::new(
                SphereGeometry::new(radius, width_segments, height_segments),
                material,
            ),
        )
    }

    /// Adds `rotation` to `node`'s rotation about each axis
    pub fn rotate_object(
        scene: &mut Scene,
        node: NodeId,
        rotation: Vector3<f32>,
    ) -> Result<(), SceneError> {
        scene.rotate(node, rotation)
    }

    /// The fixed (node, per-frame increment) table applied by `animate`
    pub fn rotations(&self) -> &[(NodeId, Vector3<f32>)] {
        &self.rotations
    }

    /// Every mesh node of the system
    pub fn bodies(&self) -> [NodeId; 4] {
        [self.sun, self.earth, self.companion, self.moon]
    }
}

impl Animation for SolarSystem {
    fn name(&self) -> &str {
        "Solar System"
    }

    /// Applies each increment once. Angles are never wrapped, so they grow
    /// without bound over long runs.
    ///
    /// Bodies removed from the scene since the last frame are dropped from
    /// the rotation table first.
    fn animate(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let before = self.rotations.len();
        self.rotations.retain(|&(node, _)| scene.contains(node));
        if self.rotations.len() < before {
            debug!(
                "Dropped {} removed node(s) from the solar system rotations",
                before - self.rotations.len()
            );
        }

        for &(node, increment) in &self.rotations {
            Self::rotate_object(scene, node, increment)?;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        materials::{HAS_MAP, HAS_NORMAL_MAP, HAS_SPECULAR_MAP},
        resources::texture_loader::tests::MemorySource,
    };

    fn compose() -> (Scene, MaterialLibrary, TextureLoader, SolarSystem) {
        let mut scene = Scene::new();
        let mut materials = MaterialLibrary::new();
        let mut textures = TextureLoader::new(MemorySource::with(&[]));
        let config = SolarSystemConfig::default().with_segments(8, 8);
        let system = SolarSystem::new(&mut scene, &mut materials, &mut textures, &config).unwrap();
        (scene, materials, textures, system)
    }

    #[test]
    fn test_hierarchy() {
        let (scene, _, _, system) = compose();
        let parent = |id| scene.node(id).unwrap().parent();

        assert_eq!(parent(system.sun), Some(scene.root()));
        assert_eq!(parent(system.earth_orbit), Some(system.sun));
        assert_eq!(parent(system.earth), Some(system.earth_orbit));
        assert_eq!(parent(system.companion_orbit), Some(system.sun));
        assert_eq!(parent(system.companion), Some(system.companion_orbit));
        assert_eq!(parent(system.moon_orbit), Some(system.companion));
        assert_eq!(parent(system.moon), Some(system.moon_orbit));
        assert_eq!(parent(system.sun_light), Some(system.sun));
        assert_eq!(parent(system.ambient_light), Some(scene.root()));

        for orbit in [system.earth_orbit, system.companion_orbit, system.moon_orbit] {
            assert_eq!(scene.node(orbit).unwrap().kind, NodeKind::Orbit);
        }

        let stats = scene.statistics();
        assert_eq!(stats.mesh_count, 4);
        assert_eq!(stats.orbit_count, 3);
        assert_eq!(stats.light_count, 2);
    }

    #[test]
    fn test_geometry_and_offsets() {
        let (scene, _, _, system) = compose();
        let mesh = |id| scene.node(id).unwrap().as_mesh().unwrap().clone();

        assert_eq!(mesh(system.sun).geometry.radius, 5.0);
        assert_eq!(mesh(system.earth).geometry.radius, 2.5);
        assert_eq!(mesh(system.companion).geometry.radius, 2.5);
        assert_eq!(mesh(system.moon).geometry.radius, 1.0);

        let x = |id| scene.world_position(id).unwrap().x;
        assert_eq!(x(system.earth), 15.0);
        assert_eq!(x(system.companion), -15.0);
        assert_eq!(x(system.moon), -10.0);
    }

    #[test]
    fn test_materials_and_textures() {
        let (scene, materials, textures, system) = compose();

        let sun_mesh = scene.node(system.sun).unwrap().as_mesh().unwrap();
        let sun = materials.get_material(&sun_mesh.material).unwrap();
        assert_eq!(sun.defines().iter().collect::<Vec<_>>(), vec![HAS_MAP]);

        let earth = materials.get_material("earth").unwrap();
        assert!(earth.defines().is_set(HAS_MAP));
        assert!(earth.defines().is_set(HAS_SPECULAR_MAP));
        assert!(earth.defines().is_set(HAS_NORMAL_MAP));

        // Shared specular and normal maps load once
        assert_eq!(textures.len(), 6);
        assert_eq!(
            materials.get_material("earth").unwrap().textures()[1],
            materials.get_material("moon").unwrap().textures()[1]
        );
    }

    #[test]
    fn test_animate_accumulates_without_wrapping() {
        let (mut scene, _, _, mut system) = compose();
        for _ in 0..10 {
            system.animate(&mut scene).unwrap();
        }

        let rotation = |scene: &Scene, id| scene.node(id).unwrap().transform.rotation;
        assert!((rotation(&scene, system.sun).y - 0.05).abs() < 1e-6);
        assert!((rotation(&scene, system.earth_orbit).y - 0.1).abs() < 1e-6);
        assert!((rotation(&scene, system.earth).y - 0.2).abs() < 1e-6);
        assert!((rotation(&scene, system.moon).y + 2.0).abs() < 1e-5);
        assert_eq!(rotation(&scene, system.moon_orbit), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(rotation(&scene, system.sun).x, 0.0);

        for _ in 0..990 {
            system.animate(&mut scene).unwrap();
        }
        // 1000 frames of -0.2 is far past a full turn and is not wrapped
        assert!((rotation(&scene, system.moon).y + 200.0).abs() < 1e-2);
    }

    #[test]
    fn test_animate_skips_removed_bodies() {
        let (mut scene, _, _, mut system) = compose();
        system.animate(&mut scene).unwrap();
        scene.remove(system.earth).unwrap();

        // Later bodies in the table keep turning once the earth is gone
        for _ in 0..2 {
            system.animate(&mut scene).unwrap();
        }
        assert_eq!(system.rotations().len(), 5);
        assert!(system.rotations().iter().all(|&(node, _)| node != system.earth));

        let companion = scene.node(system.companion).unwrap().transform.rotation;
        assert!((companion.y - 0.06).abs() < 1e-6);
        let sun = scene.node(system.sun).unwrap().transform.rotation;
        assert!((sun.y - 0.015).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_and_spin_are_independent() {
        let (mut scene, _, _, system) = compose();

        SolarSystem::rotate_object(&mut scene, system.earth, Vector3::new(0.0, 1.3, 0.0)).unwrap();
        let position = scene.world_position(system.earth).unwrap();
        assert!((position.x - 15.0).abs() < 1e-5 && position.z.abs() < 1e-5);

        let spin_before = scene.node(system.earth).unwrap().transform.rotation;
        SolarSystem::rotate_object(
            &mut scene,
            system.earth_orbit,
            Vector3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        )
        .unwrap();
        assert_eq!(scene.node(system.earth).unwrap().transform.rotation, spin_before);

        let position = scene.world_position(system.earth).unwrap();
        assert!(position.x.abs() < 1e-4);
        assert!((position.z + 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_object_reports_removed_nodes() {
        let (mut scene, _, _, system) = compose();
        scene.remove(system.companion).unwrap();
        assert_eq!(
            SolarSystem::rotate_object(&mut scene, system.companion, PLANET_SPIN),
            Err(SceneError::UnknownNode(system.companion))
        );
    }

    #[test]
    fn test_asset_dir() {
        let config = SolarSystemConfig::default().with_asset_dir("/data/textures");
        assert_eq!(config.sun_texture, PathBuf::from("/data/textures/texture_sun.jpg"));
        assert_eq!(
            config.normal_map,
            PathBuf::from("/data/textures/2k_earth_normal_map.png")
        );
    }
}
