//! CPU-side uniform staging
//!
//! Materials never talk to the GPU directly. They write named values through
//! the [`UniformSink`] trait, addressed by the [`UniformLocation`]s of their
//! compiled shader program. [`UniformBlock`] is the staging implementation:
//! values land at their byte offsets in a buffer laid out like the shader's
//! uniform struct, ready to be flushed to a GPU uniform buffer.

use std::collections::BTreeMap;

use log::warn;

use super::texture_loader::TextureHandle;

/// Texture unit a sampled texture is bound to
pub type TextureUnit = u32;

/// Byte offset of a uniform inside its block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

impl UniformLocation {
    pub fn offset(self) -> usize {
        self.0 as usize
    }
}

/// Destination for uniform writes and texture-unit binds
pub trait UniformSink {
    fn set_vec4(&mut self, location: UniformLocation, value: [f32; 4]);
    fn set_f32(&mut self, location: UniformLocation, value: f32);
    fn set_i32(&mut self, location: UniformLocation, value: i32);
    fn bind_texture(&mut self, unit: TextureUnit, texture: TextureHandle);
}

/// Byte-addressed staging copy of a uniform struct plus its texture bindings
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    bytes: Vec<u8>,
    textures: BTreeMap<TextureUnit, TextureHandle>,
    writes: usize,
}

impl UniformBlock {
    /// Zeroed block of `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            textures: BTreeMap::new(),
            writes: 0,
        }
    }

    /// Zeroed block sized for the uniform struct `T`
    pub fn for_type<T: bytemuck::Pod>() -> Self {
        Self::new(std::mem::size_of::<T>())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reinterprets the staged bytes as the uniform struct `T`
    ///
    /// Returns `None` when the block size does not match `T`.
    pub fn read<T: bytemuck::Pod>(&self) -> Option<T> {
        if self.bytes.len() != std::mem::size_of::<T>() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(&self.bytes))
    }

    pub fn texture(&self, unit: TextureUnit) -> Option<TextureHandle> {
        self.textures.get(&unit).copied()
    }

    /// Bound textures ordered by unit
    pub fn textures(&self) -> impl Iterator<Item = (TextureUnit, TextureHandle)> + '_ {
        self.textures.iter().map(|(&unit, &handle)| (unit, handle))
    }

    /// Number of uniform writes and texture binds received
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn write(&mut self, location: UniformLocation, value: &[u8]) {
        let start = location.offset();
        let end = start + value.len();
        match self.bytes.get_mut(start..end) {
            Some(slot) => {
                slot.copy_from_slice(value);
                self.writes += 1;
            }
            None => warn!(
                "Uniform write at bytes {}..{} outside a {}-byte block",
                start,
                end,
                self.bytes.len()
            ),
        }
    }
}

impl UniformSink for UniformBlock {
    fn set_vec4(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.write(location, bytemuck::bytes_of(&value));
    }

    fn set_f32(&mut self, location: UniformLocation, value: f32) {
        self.write(location, bytemuck::bytes_of(&value));
    }

    fn set_i32(&mut self, location: UniformLocation, value: i32) {
        self.write(location, bytemuck::bytes_of(&value));
    }

    fn bind_texture(&mut self, unit: TextureUnit, texture: TextureHandle) {
        self.textures.insert(unit, texture);
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    struct Sample {
        tint: [f32; 4],
        strength: f32,
        unit: i32,
        _padding: [f32; 2],
    }

    #[test]
    fn test_writes_land_at_offsets() {
        let mut block = UniformBlock::for_type::<Sample>();
        block.set_vec4(UniformLocation(0), [1.0, 0.5, 0.25, 1.0]);
        block.set_f32(UniformLocation(16), 30.0);
        block.set_i32(UniformLocation(20), 1);

        let sample: Sample = block.read().unwrap();
        assert_eq!(sample.tint, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(sample.strength, 30.0);
        assert_eq!(sample.unit, 1);
        assert_eq!(block.write_count(), 3);
    }

    #[test]
    fn test_out_of_range_write_is_dropped() {
        let mut block = UniformBlock::new(8);
        block.set_vec4(UniformLocation(4), [1.0; 4]);
        assert_eq!(block.write_count(), 0);
        assert!(block.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_texture_bindings_by_unit() {
        let mut block = UniformBlock::new(0);
        block.bind_texture(1, TextureHandle(4));
        block.bind_texture(0, TextureHandle(9));

        assert_eq!(block.texture(0), Some(TextureHandle(9)));
        assert_eq!(block.texture(2), None);
        let bound: Vec<_> = block.textures().collect();
        assert_eq!(bound, vec![(0, TextureHandle(9)), (1, TextureHandle(4))]);
    }

    #[test]
    fn test_read_rejects_mismatched_size() {
        let block = UniformBlock::new(4);
        assert!(block.read::<Sample>().is_none());
    }
}
