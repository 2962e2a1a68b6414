//! # Materials
//!
//! Materials map a handful of named properties onto shader uniform slots.
//!
//! Each material owns its [`ShaderDefines`], derived once at construction from
//! which optional textures were supplied, and an optional compiled
//! [`ShaderProgram`]. Uploading uniforms before the program exists fails with
//! [`MaterialError::ShaderNotInitialized`] and writes nothing.
//!
//! - [`PhongMaterial`] - lit material with specular highlights and distance fog
//! - [`BasicMaterial`] - unlit color, optionally multiplied by a texture
//! - [`MaterialLibrary`] - id-keyed storage with a default fallback

pub mod basic;
pub mod library;
pub mod phong;
pub mod shader;

use thiserror::Error;

use crate::gfx::resources::{TextureHandle, UniformBlock, UniformSink};

pub use basic::{BasicMaterial, BasicMaterialOptions, BasicUniform};
pub use library::{MaterialLibrary, DEFAULT_MATERIAL_ID};
pub use phong::{PhongMaterial, PhongMaterialOptions, PhongUniform};
pub use shader::{
    ShaderDefines, ShaderProgram, ShaderTemplate, HAS_MAP, HAS_NORMAL_MAP, HAS_SPECULAR_MAP,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// Errors raised by materials
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaterialError {
    #[error("the shader has not been initialized")]
    ShaderNotInitialized,
    #[error("shader '{shader}' has no uniform named '{uniform}'")]
    MissingUniform {
        shader: &'static str,
        uniform: &'static str,
    },
    #[error("uniform block is {actual} bytes, expected {expected}")]
    BlockSize { expected: usize, actual: usize },
    #[error("no material named '{0}'")]
    UnknownMaterial(MaterialId),
}

/// Common interface over every material kind
pub trait Material {
    fn name(&self) -> &str;

    /// Feature flags fixed at construction
    fn defines(&self) -> &ShaderDefines;

    /// Compiled program, if [`Material::init_shader`] has run
    fn shader(&self) -> Option<&ShaderProgram>;

    /// Compiles the shader program for this material's defines
    fn init_shader(&mut self) -> &ShaderProgram;

    /// Size in bytes of this material's uniform struct
    fn uniform_size(&self) -> usize;

    /// Textures this material samples, in unit order
    fn textures(&self) -> Vec<TextureHandle>;

    /// Writes every uniform through `sink`
    ///
    /// Fails without writing anything when the shader is not initialized.
    fn upload_uniforms(&self, sink: &mut dyn UniformSink) -> Result<(), MaterialError>;

    /// Uploads into a fresh staging block sized for this material
    fn stage_uniforms(&self) -> Result<UniformBlock, MaterialError> {
        let mut block = UniformBlock::new(self.uniform_size());
        self.upload_uniforms(&mut block)?;
        Ok(block)
    }
}
