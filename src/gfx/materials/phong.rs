//! Phong lighting material with distance fog

use std::mem::{offset_of, size_of};

use super::{
    shader::{
        ShaderDefines, ShaderProgram, ShaderTemplate, HAS_MAP, HAS_NORMAL_MAP, HAS_SPECULAR_MAP,
    },
    Material, MaterialError,
};
use crate::gfx::resources::{TextureHandle, TextureUnit, UniformSink};

/// Texture unit of the diffuse map
pub const MAP_UNIT: TextureUnit = 0;
/// Texture unit of the specular map
pub const SPECULAR_MAP_UNIT: TextureUnit = 1;
/// Texture unit of the normal map
pub const NORMAL_MAP_UNIT: TextureUnit = 2;

/// GPU uniform data for Phong materials
///
/// MUST match the `PhongUniform` struct in `phong.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhongUniform {
    pub color: [f32; 4],
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    pub fog_color: [f32; 4],
    pub shininess: f32,
    pub min_fog_distance: f32,
    pub max_fog_distance: f32,
    /// Sampler slots, written only when the matching map exists
    pub map: i32,
    pub specular_map: i32,
    pub normal_map: i32,
    _padding: [i32; 2],
}
// Total: 4 * 16 + 3 * 4 + 3 * 4 + 8 = 96 bytes

pub const PHONG_SHADER: ShaderTemplate = ShaderTemplate {
    name: "phong",
    source: include_str!("../../shaders/phong.wgsl"),
    uniforms: &[
        ("color", offset_of!(PhongUniform, color) as u32),
        ("specular", offset_of!(PhongUniform, specular) as u32),
        ("ambient", offset_of!(PhongUniform, ambient) as u32),
        ("fog_color", offset_of!(PhongUniform, fog_color) as u32),
        ("shininess", offset_of!(PhongUniform, shininess) as u32),
        ("min_fog_distance", offset_of!(PhongUniform, min_fog_distance) as u32),
        ("max_fog_distance", offset_of!(PhongUniform, max_fog_distance) as u32),
        ("map", offset_of!(PhongUniform, map) as u32),
        ("specular_map", offset_of!(PhongUniform, specular_map) as u32),
        ("normal_map", offset_of!(PhongUniform, normal_map) as u32),
    ],
    features: &[HAS_MAP, HAS_SPECULAR_MAP, HAS_NORMAL_MAP],
};

/// Construction options; anything left out keeps its default
#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterialOptions {
    pub color: [f32; 4],
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    pub shininess: f32,
    pub fog_color: [f32; 4],
    pub min_fog_distance: f32,
    pub max_fog_distance: f32,
    pub map: Option<TextureHandle>,
    pub specular_map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
}

impl Default for PhongMaterialOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0, 1.0],
            ambient: [0.2, 0.2, 0.2, 1.0],
            shininess: 30.0,
            fog_color: [1.0, 0.6, 0.6, 1.0],
            min_fog_distance: 10.0,
            max_fog_distance: 35.0,
            map: None,
            specular_map: None,
            normal_map: None,
        }
    }
}

impl PhongMaterialOptions {
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_specular(mut self, specular: [f32; 4]) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_ambient(mut self, ambient: [f32; 4]) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn with_fog(mut self, color: [f32; 4], min_distance: f32, max_distance: f32) -> Self {
        self.fog_color = color;
        self.min_fog_distance = min_distance;
        self.max_fog_distance = max_distance;
        self
    }

    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_specular_map(mut self, specular_map: TextureHandle) -> Self {
        self.specular_map = Some(specular_map);
        self
    }

    pub fn with_normal_map(mut self, normal_map: TextureHandle) -> Self {
        self.normal_map = Some(normal_map);
        self
    }
}

/// Lit material with specular highlights and linear distance fog
///
/// Scalar and color properties may be changed freely; the texture maps are
/// fixed at construction because the feature flags are derived from them.
#[derive(Debug, Clone)]
pub struct PhongMaterial {
    name: String,
    pub color: [f32; 4],
    pub specular: [f32; 4],
    pub ambient: [f32; 4],
    pub shininess: f32,
    pub fog_color: [f32; 4],
    pub min_fog_distance: f32,
    pub max_fog_distance: f32,
    map: Option<TextureHandle>,
    specular_map: Option<TextureHandle>,
    normal_map: Option<TextureHandle>,
    defines: ShaderDefines,
    shader: Option<ShaderProgram>,
}

impl PhongMaterial {
    pub fn new(name: impl Into<String>, options: PhongMaterialOptions) -> Self {
        let mut defines = ShaderDefines::new();
        if options.map.is_some() {
            defines.set(HAS_MAP);
        }
        if options.specular_map.is_some() {
            defines.set(HAS_SPECULAR_MAP);
        }
        if options.normal_map.is_some() {
            defines.set(HAS_NORMAL_MAP);
        }

        Self {
            name: name.into(),
            color: options.color,
            specular: options.specular,
            ambient: options.ambient,
            shininess: options.shininess,
            fog_color: options.fog_color,
            min_fog_distance: options.min_fog_distance,
            max_fog_distance: options.max_fog_distance,
            map: options.map,
            specular_map: options.specular_map,
            normal_map: options.normal_map,
            defines,
            shader: None,
        }
    }

    pub fn map(&self) -> Option<TextureHandle> {
        self.map
    }

    pub fn specular_map(&self) -> Option<TextureHandle> {
        self.specular_map
    }

    pub fn normal_map(&self) -> Option<TextureHandle> {
        self.normal_map
    }

    /// Present maps paired with their unit and sampler uniform name
    fn bound_maps(&self) -> impl Iterator<Item = (TextureHandle, TextureUnit, &'static str)> {
        [
            (self.map, MAP_UNIT, "map"),
            (self.specular_map, SPECULAR_MAP_UNIT, "specular_map"),
            (self.normal_map, NORMAL_MAP_UNIT, "normal_map"),
        ]
        .into_iter()
        .filter_map(|(handle, unit, uniform)| handle.map(|handle| (handle, unit, uniform)))
    }
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::new("Default", PhongMaterialOptions::default())
    }
}

impl Material for PhongMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    fn shader(&self) -> Option<&ShaderProgram> {
        self.shader.as_ref()
    }

    fn init_shader(&mut self) -> &ShaderProgram {
        let defines = &self.defines;
        self.shader
            .get_or_insert_with(|| ShaderProgram::compile(&PHONG_SHADER, defines))
    }

    fn uniform_size(&self) -> usize {
        size_of::<PhongUniform>()
    }

    fn textures(&self) -> Vec<TextureHandle> {
        self.bound_maps().map(|(handle, _, _)| handle).collect()
    }

    fn upload_uniforms(&self, sink: &mut dyn UniformSink) -> Result<(), MaterialError> {
        let shader = self
            .shader
            .as_ref()
            .ok_or(MaterialError::ShaderNotInitialized)?;

        // Resolve everything first so a bad program leaves the sink untouched
        let vec4s = [
            (shader.location("color")?, self.color),
            (shader.location("specular")?, self.specular),
            (shader.location("ambient")?, self.ambient),
            (shader.location("fog_color")?, self.fog_color),
        ];
        let scalars = [
            (shader.location("min_fog_distance")?, self.min_fog_distance),
            (shader.location("max_fog_distance")?, self.max_fog_distance),
            (shader.location("shininess")?, self.shininess),
        ];
        let samplers = self
            .bound_maps()
            .map(|(handle, unit, uniform)| Ok((shader.location(uniform)?, unit, handle)))
            .collect::<Result<Vec<_>, MaterialError>>()?;

        for (location, value) in vec4s {
            sink.set_vec4(location, value);
        }
        for (location, value) in scalars {
            sink.set_f32(location, value);
        }
        for (location, unit, handle) in samplers {
            sink.bind_texture(unit, handle);
            sink.set_i32(location, unit as i32);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::{UniformBlock, UniformLocation};

    /// Counts every call so tests can assert nothing was written
    #[derive(Default)]
    struct CountingSink {
        calls: usize,
    }

    impl UniformSink for CountingSink {
        fn set_vec4(&mut self, _: UniformLocation, _: [f32; 4]) {
            self.calls += 1;
        }
        fn set_f32(&mut self, _: UniformLocation, _: f32) {
            self.calls += 1;
        }
        fn set_i32(&mut self, _: UniformLocation, _: i32) {
            self.calls += 1;
        }
        fn bind_texture(&mut self, _: TextureUnit, _: TextureHandle) {
            self.calls += 1;
        }
    }

    #[test]
    fn test_uniform_layout_size() {
        assert_eq!(size_of::<PhongUniform>(), 96);
        assert_eq!(size_of::<PhongUniform>() % 16, 0);
    }

    #[test]
    fn test_defaults() {
        let material = PhongMaterial::default();
        assert_eq!(material.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(material.specular, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(material.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(material.shininess, 30.0);
        assert_eq!(material.fog_color, [1.0, 0.6, 0.6, 1.0]);
        assert_eq!(material.min_fog_distance, 10.0);
        assert_eq!(material.max_fog_distance, 35.0);
        assert_eq!(material.map(), None);
        assert_eq!(material.specular_map(), None);
    }

    #[test]
    fn test_no_maps_no_flags() {
        let material = PhongMaterial::new("plain", PhongMaterialOptions::default());
        assert!(material.defines().is_empty());
        assert!(material.textures().is_empty());
    }

    #[test]
    fn test_only_map_sets_only_diffuse_flag() {
        let material = PhongMaterial::new(
            "mapped",
            PhongMaterialOptions::default().with_map(TextureHandle(3)),
        );
        assert!(material.defines().is_set(HAS_MAP));
        assert!(!material.defines().is_set(HAS_SPECULAR_MAP));
        assert_eq!(material.defines().len(), 1);
    }

    #[test]
    fn test_only_specular_map_sets_only_specular_flag() {
        let material = PhongMaterial::new(
            "shiny",
            PhongMaterialOptions::default().with_specular_map(TextureHandle(1)),
        );
        assert_eq!(material.defines().iter().collect::<Vec<_>>(), vec![HAS_SPECULAR_MAP]);
    }

    #[test]
    fn test_upload_without_shader_fails_and_writes_nothing() {
        let material = PhongMaterial::new(
            "uninitialized",
            PhongMaterialOptions::default().with_map(TextureHandle(0)),
        );
        let mut sink = CountingSink::default();

        assert_eq!(
            material.upload_uniforms(&mut sink),
            Err(MaterialError::ShaderNotInitialized)
        );
        assert_eq!(sink.calls, 0);
        assert!(material.stage_uniforms().is_err());
    }

    #[test]
    fn test_upload_writes_scalars_without_maps() {
        let mut material = PhongMaterial::new(
            "plain",
            PhongMaterialOptions::default().with_shininess(1.0),
        );
        material.init_shader();

        let block = material.stage_uniforms().unwrap();
        let uniform: PhongUniform = block.read().unwrap();
        assert_eq!(uniform.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(uniform.fog_color, [1.0, 0.6, 0.6, 1.0]);
        assert_eq!(uniform.shininess, 1.0);
        assert_eq!(uniform.min_fog_distance, 10.0);
        assert_eq!(uniform.max_fog_distance, 35.0);
        // 4 colors + 3 scalars, no texture work
        assert_eq!(block.write_count(), 7);
        assert_eq!(block.textures().count(), 0);
    }

    #[test]
    fn test_upload_binds_maps_to_fixed_units() {
        let mut material = PhongMaterial::new(
            "earth",
            PhongMaterialOptions::default()
                .with_map(TextureHandle(10))
                .with_specular_map(TextureHandle(11)),
        );
        material.init_shader();

        let mut block = UniformBlock::for_type::<PhongUniform>();
        material.upload_uniforms(&mut block).unwrap();

        assert_eq!(block.texture(MAP_UNIT), Some(TextureHandle(10)));
        assert_eq!(block.texture(SPECULAR_MAP_UNIT), Some(TextureHandle(11)));
        assert_eq!(block.texture(NORMAL_MAP_UNIT), None);

        let uniform: PhongUniform = block.read().unwrap();
        assert_eq!(uniform.map, 0);
        assert_eq!(uniform.specular_map, 1);
    }

    #[test]
    fn test_shader_carries_material_defines() {
        let mut material = PhongMaterial::new(
            "mapped",
            PhongMaterialOptions::default().with_map(TextureHandle(0)),
        );
        let program = material.init_shader();
        assert!(program.source().starts_with("const HAS_MAP: bool = true;\n"));
        assert!(program
            .source()
            .contains("const HAS_SPECULAR_MAP: bool = false;\n"));
    }
}
