// src/gfx/resources/mod.rs
//! GPU-facing resources
//!
//! Texture loading and upload, uniform staging, frame uniforms and material
//! bind groups.

pub mod global_bindings;
pub mod gpu_material;
pub mod texture_loader;
pub mod texture_resource;
pub mod uniform_block;

// Re-export main types
pub use global_bindings::GlobalBindings;
pub use gpu_material::{material_bind_group_layout, GpuMaterialBinding, MAX_TEXTURE_UNITS};
pub use texture_loader::{
    FileTextureSource, TextureData, TextureError, TextureHandle, TextureLoader, TextureSource,
    TextureState,
};
pub use texture_resource::TextureResource;
pub use uniform_block::{TextureUnit, UniformBlock, UniformLocation, UniformSink};
