//! Unlit color material, optionally tinting a texture

use std::mem::{offset_of, size_of};

use super::{
    shader::{ShaderDefines, ShaderProgram, ShaderTemplate, HAS_MAP},
    Material, MaterialError,
};
use crate::gfx::resources::{TextureHandle, TextureUnit, UniformSink};

/// Texture unit of the tinted map
pub const MAP_UNIT: TextureUnit = 0;

/// GPU uniform data for basic materials
///
/// MUST match the `BasicUniform` struct in `basic.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BasicUniform {
    pub color: [f32; 4],
    pub map: i32,
    _padding: [i32; 3],
}

pub const BASIC_SHADER: ShaderTemplate = ShaderTemplate {
    name: "basic",
    source: include_str!("../../shaders/basic.wgsl"),
    uniforms: &[
        ("color", offset_of!(BasicUniform, color) as u32),
        ("map", offset_of!(BasicUniform, map) as u32),
    ],
    features: &[HAS_MAP],
};

#[derive(Debug, Clone, PartialEq)]
pub struct BasicMaterialOptions {
    pub color: [f32; 4],
    pub map: Option<TextureHandle>,
}

impl Default for BasicMaterialOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            map: None,
        }
    }
}

impl BasicMaterialOptions {
    /// Builder pattern: set the tint from a packed `0xRRGGBB` color
    pub fn with_hex_color(mut self, hex: u32) -> Self {
        let [r, g, b] = crate::gfx::scene::rgb_from_hex(hex);
        self.color = [r, g, b, 1.0];
        self
    }

    pub fn with_map(mut self, map: TextureHandle) -> Self {
        self.map = Some(map);
        self
    }
}

/// Ignores lighting; output is `color * map`
#[derive(Debug, Clone)]
pub struct BasicMaterial {
    name: String,
    pub color: [f32; 4],
    map: Option<TextureHandle>,
    defines: ShaderDefines,
    shader: Option<ShaderProgram>,
}

impl BasicMaterial {
    pub fn new(name: impl Into<String>, options: BasicMaterialOptions) -> Self {
        let mut defines = ShaderDefines::new();
        if options.map.is_some() {
            defines.set(HAS_MAP);
        }

        Self {
            name: name.into(),
            color: options.color,
            map: options.map,
            defines,
            shader: None,
        }
    }

    pub fn map(&self) -> Option<TextureHandle> {
        self.map
    }
}

impl Material for BasicMaterial {
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
            .get_or_insert_with(|| ShaderProgram::compile(&BASIC_SHADER, defines))
    }

    fn uniform_size(&self) -> usize {
        size_of::<BasicUniform>()
    }

    fn textures(&self) -> Vec<TextureHandle> {
        self.map.into_iter().collect()
    }

    fn upload_uniforms(&self, sink: &mut dyn UniformSink) -> Result<(), MaterialError> {
        let shader = self
            .shader
            .as_ref()
            .ok_or(MaterialError::ShaderNotInitialized)?;

        let color = shader.location("color")?;
        let map = match self.map {
            Some(handle) => Some((shader.location("map")?, handle)),
            None => None,
        };

        sink.set_vec4(color, self.color);
        if let Some((location, handle)) = map {
            sink.bind_texture(MAP_UNIT, handle);
            sink.set_i32(location, MAP_UNIT as i32);
        }

        Ok(())
    }
}
