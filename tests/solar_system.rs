use std::path::Path;

use cgmath::{InnerSpace, Vector3};
use orrery::{
    gfx::{
        materials::MaterialError,
        resources::{TextureData, TextureError, TextureLoader, TextureSource, TextureState},
        scene::NodeKind,
    },
    Orrery, SolarSystem, SolarSystemConfig,
};
use rand::Rng;

/// Serves a 2x2 checker for every path except those containing "missing"
struct CheckerSource;

impl TextureSource for CheckerSource {
    fn fetch(&self, path: &Path) -> Result<TextureData, TextureError> {
        if path.to_string_lossy().contains("missing") {
            return TextureData::from_rgba(path, 2, 2, Vec::new());
        }
        let rgba = [255, 255, 255, 255, 0, 0, 0, 255].repeat(2);
        TextureData::from_rgba(path, 2, 2, rgba)
    }
}

fn orrery_with(config: &SolarSystemConfig) -> (Orrery, SolarSystem) {
    let mut orrery = Orrery::with_texture_loader(TextureLoader::new(CheckerSource));
    let system = orrery.add_solar_system(config).unwrap();
    (orrery, system)
}

fn small_config() -> SolarSystemConfig {
    SolarSystemConfig::default().with_segments(12, 8)
}

#[test]
fn orbit_rotation_keeps_distance_and_spin() {
    let (mut orrery, system) = orrery_with(&small_config());
    let mut rng = rand::rng();

    for _ in 0..50 {
        let orbit = Vector3::new(0.0, rng.random_range(-3.0..3.0), 0.0);
        let spin = Vector3::new(0.0, rng.random_range(-3.0..3.0), 0.0);
        let scene = orrery.scene_mut();

        let spin_before = scene.node(system.companion).unwrap().transform.rotation;
        SolarSystem::rotate_object(scene, system.companion_orbit, orbit).unwrap();
        assert_eq!(
            scene.node(system.companion).unwrap().transform.rotation,
            spin_before
        );

        let position = scene.world_position(system.companion).unwrap();
        SolarSystem::rotate_object(scene, system.companion, spin).unwrap();
        let after_spin = scene.world_position(system.companion).unwrap();
        assert!((position - after_spin).magnitude() < 1e-4);

        let sun = scene.world_position(system.sun).unwrap();
        assert!(((position - sun).magnitude() - 15.0).abs() < 1e-3);
    }
}

#[test]
fn moon_follows_companion() {
    let (mut orrery, system) = orrery_with(&small_config());
    for _ in 0..120 {
        orrery.tick().unwrap();
    }

    let scene = orrery.scene();
    let companion = scene.world_position(system.companion).unwrap();
    let moon = scene.world_position(system.moon).unwrap();
    // The moon orbit is never rotated, so the moon's offset only turns with
    // the companion's own spin
    assert!(((moon - companion).magnitude() - 5.0).abs() < 1e-3);
}

#[test]
fn lighting_comes_from_the_sun() {
    let (mut orrery, _) = orrery_with(&small_config());
    orrery.tick().unwrap();

    let lighting = orrery.scene().lighting();
    assert_eq!(lighting.point_lights.len(), 1);
    assert_eq!(lighting.point_lights[0].intensity, 3.0);
    assert!(lighting.point_lights[0].position.magnitude() < 1e-6);
    for channel in lighting.ambient {
        assert!((channel - 0.4).abs() < 1e-6);
    }
}

#[test]
fn failed_textures_do_not_block_frames() {
    let mut config = small_config();
    config.moon_texture = "assets/missing_moon.png".into();
    let (mut orrery, system) = orrery_with(&config);

    orrery.textures_mut().wait_all();
    for _ in 0..3 {
        orrery.tick().unwrap();
    }

    let moon = orrery.materials().get_material("moon").unwrap();
    let map = moon.textures()[0];
    assert!(matches!(
        orrery.textures().state(map),
        Some(TextureState::Failed(TextureError::InvalidData { .. }))
    ));
    assert!(orrery.draw_list().iter().any(|draw| draw.node == system.moon));
}

#[test]
fn uniforms_require_initialized_shaders() {
    let (mut orrery, _) = orrery_with(&small_config());

    let earth = orrery.materials().get_material("earth").unwrap();
    assert_eq!(
        earth.stage_uniforms().unwrap_err(),
        MaterialError::ShaderNotInitialized
    );

    orrery.prepare_shaders();
    let earth = orrery.materials().get_material("earth").unwrap();
    let block = earth.stage_uniforms().unwrap();
    assert_eq!(block.as_bytes().len(), earth.uniform_size());
    assert_eq!(block.textures().count(), 3);
}

#[test]
fn structure_matches_the_solar_system() {
    let (orrery, system) = orrery_with(&small_config());
    let scene = orrery.scene();

    let names: Vec<&str> = [
        system.sun,
        system.earth_orbit,
        system.earth,
        system.companion_orbit,
        system.companion,
        system.moon_orbit,
        system.moon,
    ]
    .iter()
    .map(|&id| scene.node(id).unwrap().name.as_str())
    .collect();
    assert_eq!(
        names,
        ["Sun", "Earth Orbit", "Earth", "Companion Orbit", "Companion", "Moon Orbit", "Moon"]
    );

    assert_eq!(scene.find_by_name("Sun"), Some(system.sun));
    assert!(matches!(
        scene.node(system.sun_light).unwrap().kind,
        NodeKind::PointLight(_)
    ));
    assert_eq!(
        scene.node(system.sun_light).unwrap().parent(),
        Some(system.sun)
    );
}

#[test]
fn removing_a_body_takes_its_satellites() {
    let (mut orrery, system) = orrery_with(&small_config());
    let removed = orrery.scene_mut().remove(system.companion).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(!orrery.scene().contains(system.moon));

    // The rest of the system keeps turning without the removed bodies
    let report = orrery.tick().unwrap();
    assert_eq!(report.animations_run, 1);
    let earth = orrery.scene().node(system.earth).unwrap();
    assert!((earth.transform.rotation.y - 0.02).abs() < 1e-6);
}
