//! GPU side of a material: uniform buffer plus texture bind group
//!
//! Bind group layout for material group:
//! - binding 0: uniform struct
//! - binding 1 + 2u: texture on unit u
//! - binding 2 + 2u: sampler on unit u

use std::collections::HashMap;

use log::trace;
use wgpu::Device;

use super::{texture_loader::TextureHandle, texture_resource::TextureResource, UniformBlock};
use crate::{gfx::materials::MaterialError, wgpu_utils::binding_types};

/// Texture units every material layout reserves
pub const MAX_TEXTURE_UNITS: u32 = 3;

fn texture_binding(unit: u32) -> u32 {
    1 + unit * 2
}

fn sampler_binding(unit: u32) -> u32 {
    2 + unit * 2
}

/// Layout shared by every material bind group
pub fn material_bind_group_layout(device: &Device) -> wgpu::BindGroupLayout {
    let mut entries = vec![binding_types::fragment_entry(0, binding_types::uniform())];
    for unit in 0..MAX_TEXTURE_UNITS {
        entries.push(binding_types::fragment_entry(
            texture_binding(unit),
            binding_types::texture_2d(),
        ));
        entries.push(binding_types::fragment_entry(
            sampler_binding(unit),
            binding_types::filtering_sampler(),
        ));
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Material Bind Group Layout"),
        entries: &entries,
    })
}

/// Uniform buffer holding one material's staged block
///
/// Sized once from [`Material::uniform_size`](crate::gfx::materials::Material::uniform_size);
/// redundant uploads are skipped.
pub struct GpuMaterialBinding {
    buffer: wgpu::Buffer,
    size: usize,
    previous_content: Vec<u8>,
}

impl GpuMaterialBinding {
    pub fn new(device: &Device, label: &str, size: usize) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            size,
            previous_content: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Copies a staged block into the uniform buffer
    ///
    /// Returns whether a write was queued.
    pub fn flush(
        &mut self,
        queue: &wgpu::Queue,
        block: &UniformBlock,
    ) -> Result<bool, MaterialError> {
        check_block_size(self.size, block)?;

        let content = block.as_bytes();
        if self.previous_content == content {
            return Ok(false);
        }
        queue.write_buffer(&self.buffer, 0, content);
        self.previous_content = content.to_vec();
        trace!("Flushed {} uniform bytes", content.len());
        Ok(true)
    }

    /// Builds the bind group for a staged block
    ///
    /// Units with no bound texture, or whose texture is not uploaded yet,
    /// sample `fallback` instead.
    pub fn create_bind_group(
        &self,
        device: &Device,
        layout: &wgpu::BindGroupLayout,
        block: &UniformBlock,
        textures: &HashMap<TextureHandle, TextureResource>,
        fallback: &TextureResource,
    ) -> wgpu::BindGroup {
        let resources: Vec<&TextureResource> = (0..MAX_TEXTURE_UNITS)
            .map(|unit| {
                block
                    .texture(unit)
                    .and_then(|handle| textures.get(&handle))
                    .unwrap_or(fallback)
            })
            .collect();

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: self.buffer.as_entire_binding(),
        }];
        for (unit, resource) in (0..MAX_TEXTURE_UNITS).zip(&resources) {
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding(unit),
                resource: wgpu::BindingResource::TextureView(&resource.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding(unit),
                resource: wgpu::BindingResource::Sampler(&resource.sampler),
            });
        }

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout,
            entries: &entries,
        })
    }
}

fn check_block_size(expected: usize, block: &UniformBlock) -> Result<(), MaterialError> {
    let actual = block.as_bytes().len();
    if actual != expected {
        return Err(MaterialError::BlockSize { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_slots_do_not_overlap() {
        let mut slots = vec![0];
        for unit in 0..MAX_TEXTURE_UNITS {
            slots.push(texture_binding(unit));
            slots.push(sampler_binding(unit));
        }
        let mut sorted = slots.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), slots.len());
        assert_eq!(sorted, (0..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_block_size_mismatch() {
        assert_eq!(check_block_size(32, &UniformBlock::new(32)), Ok(()));
        assert_eq!(
            check_block_size(96, &UniformBlock::new(32)),
            Err(MaterialError::BlockSize {
                expected: 96,
                actual: 32
            })
        );
    }
}
