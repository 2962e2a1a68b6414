//! Per-frame uniform bindings for camera and lighting
//!
//! Group 0 in every pipeline:
//! - binding 0: [`CameraUniform`]
//! - binding 1: [`LightingUniform`]

use crate::{
    gfx::{camera::CameraUniform, scene::LightingUniform},
    wgpu_utils::{binding_types, UniformBuffer},
};

/// Uniform buffers and bind group shared by every draw in a frame
pub struct GlobalBindings {
    camera: UniformBuffer<CameraUniform>,
    lighting: UniformBuffer<LightingUniform>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let camera = UniformBuffer::new(device);
        let lighting = UniformBuffer::new(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[
                binding_types::vertex_fragment_entry(0, binding_types::uniform()),
                binding_types::fragment_entry(1, binding_types::uniform()),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting.binding_resource(),
                },
            ],
        });

        Self {
            camera,
            lighting,
            bind_group_layout,
            bind_group,
        }
    }

    /// Uploads this frame's camera and lighting
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        camera: CameraUniform,
        lighting: LightingUniform,
    ) {
        self.camera.update_content(queue, camera);
        self.lighting.update_content(queue, lighting);
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
