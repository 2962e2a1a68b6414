//! WGPU-based rendering engine for the orrery
//!
//! Renders the scene graph offscreen, or into any texture view handed in by a
//! windowing layer. GPU resources are created lazily from the CPU-side scene:
//!
//! - vertex and index buffers per distinct sphere tessellation
//! - one model uniform per mesh node
//! - one material uniform buffer per material
//! - one texture per loader handle, uploaded once it is ready

use std::{collections::HashMap, sync::Arc};

use log::{debug, info, trace};
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::{
    draw::{collect_draws, DrawCommand},
    pipeline_manager::{PipelineConfig, PipelineManager},
    vertex::Vertex3D,
};
use crate::{
    gfx::{
        camera::OrbitCamera,
        geometry::SphereGeometry,
        materials::{MaterialError, MaterialId, MaterialLibrary},
        resources::{
            material_bind_group_layout, GlobalBindings, GpuMaterialBinding, TextureHandle,
            TextureData, TextureLoader, TextureResource,
        },
        scene::{NodeId, Scene},
    },
    wgpu_utils::{binding_types, UniformBuffer},
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error("frame readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
    #[error("frame readback was abandoned")]
    ReadbackAbandoned,
}

/// Model transform uniform, group 1 binding 0
type ModelUniform = [[f32; 4]; 4];

/// Sphere tessellations are cached by exact parameters
type MeshKey = (u32, u32, u32);

fn mesh_key(geometry: &SphereGeometry) -> MeshKey {
    (
        geometry.radius.to_bits(),
        geometry.width_segments,
        geometry.height_segments,
    )
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct ModelBinding {
    ubo: UniformBuffer<ModelUniform>,
    bind_group: wgpu::BindGroup,
}

/// Per-draw data resolved before the render pass begins
struct PreparedDraw {
    node: NodeId,
    mesh: MeshKey,
    pipeline: String,
    material_bind_group: wgpu::BindGroup,
}

/// Counters from the last rendered frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: usize,
    pub pipelines: usize,
    pub textures_uploaded: usize,
}

pub struct RenderEngine {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    width: u32,
    height: u32,
    color_target: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_texture: TextureResource,
    globals: GlobalBindings,
    model_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    pipeline_manager: PipelineManager,
    fallback_texture: TextureResource,
    textures: HashMap<TextureHandle, TextureResource>,
    meshes: HashMap<MeshKey, GpuMesh>,
    models: HashMap<NodeId, ModelBinding>,
    materials: HashMap<MaterialId, GpuMaterialBinding>,
    pub camera: OrbitCamera,
    pub clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Opens the default adapter without a surface and renders offscreen
    pub async fn new_headless(width: u32, height: u32) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Orrery Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self::from_device(
            Arc::new(device),
            Arc::new(queue),
            width,
            height,
            PipelineConfig::default(),
        ))
    }

    /// Builds the engine on a device owned by the caller
    pub fn from_device(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        width: u32,
        height: u32,
        config: PipelineConfig,
    ) -> Self {
        let (color_target, color_view) =
            create_color_target(&device, width, height, config.color_format);
        let depth_texture =
            TextureResource::create_depth_texture(&device, width, height, "Depth Texture");

        let globals = GlobalBindings::new(&device);
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[binding_types::vertex_fragment_entry(
                0,
                binding_types::uniform(),
            )],
        });
        let material_layout = material_bind_group_layout(&device);

        let pipeline_manager = PipelineManager::new(
            &device,
            &[globals.bind_group_layout(), &model_layout, &material_layout],
            config,
        );
        let fallback_texture = TextureResource::fallback(&device, &queue);

        let mut camera = OrbitCamera::default();
        camera.resize_projection(width, height);

        Self {
            device,
            queue,
            width,
            height,
            color_target,
            color_view,
            depth_texture,
            globals,
            model_layout,
            material_layout,
            pipeline_manager,
            fallback_texture,
            textures: HashMap::new(),
            meshes: HashMap::new(),
            models: HashMap::new(),
            materials: HashMap::new(),
            camera,
            clear_color: wgpu::Color::BLACK,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Offscreen color target rendered by [`render`](Self::render)
    pub fn color_target(&self) -> &wgpu::Texture {
        &self.color_target
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        let format = self.color_target.format();
        (self.color_target, self.color_view) =
            create_color_target(&self.device, width, height, format);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, width, height, "Depth Texture");
        self.camera.resize_projection(width, height);
        self.width = width;
        self.height = height;
    }

    /// Uploads every texture that became ready since the last call
    ///
    /// Returns how many textures were uploaded.
    pub fn sync_textures(&mut self, loader: &TextureLoader) -> usize {
        let mut uploaded = 0;
        for handle in loader.handles() {
            if self.textures.contains_key(&handle) {
                continue;
            }
            let Some(data) = loader.data(handle) else {
                continue;
            };
            let label = loader
                .path(handle)
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| format!("{:?}", handle));
            let resource =
                TextureResource::from_texture_data(&self.device, &self.queue, &data, &label);
            self.textures.insert(handle, resource);
            uploaded += 1;
        }
        if uploaded > 0 {
            debug!("Uploaded {} texture(s)", uploaded);
        }
        uploaded
    }

    /// Renders one frame into the offscreen target
    pub fn render(
        &mut self,
        scene: &Scene,
        materials: &MaterialLibrary,
        textures: &TextureLoader,
    ) -> Result<RenderStats, RenderError> {
        let view = self.color_view.clone();
        self.render_to_view(&view, scene, materials, textures)
    }

    /// Renders one frame into `view`, which must match the configured color
    /// format and size
    ///
    /// Fails before recording any GPU work when a drawn material has no
    /// compiled shader.
    pub fn render_to_view(
        &mut self,
        view: &wgpu::TextureView,
        scene: &Scene,
        materials: &MaterialLibrary,
        textures: &TextureLoader,
    ) -> Result<RenderStats, RenderError> {
        let textures_uploaded = self.sync_textures(textures);
        self.globals
            .update(&self.queue, self.camera.uniform(), scene.lighting().uniform());

        self.models.retain(|node, _| scene.contains(*node));

        let draws = collect_draws(scene, materials);
        let mut prepared = Vec::with_capacity(draws.len());
        for draw in &draws {
            prepared.push(self.prepare_draw(draw, materials)?);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, self.globals.bind_group(), &[]);
            for draw in &prepared {
                let (Some(pipeline), Some(mesh), Some(model)) = (
                    self.pipeline_manager.get(&draw.pipeline),
                    self.meshes.get(&draw.mesh),
                    self.models.get(&draw.node),
                ) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &model.bind_group, &[]);
                pass.set_bind_group(2, &draw.material_bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));

        let stats = RenderStats {
            draw_calls: prepared.len(),
            pipelines: self.pipeline_manager.get_stats().total_pipelines,
            textures_uploaded,
        };
        trace!("Rendered frame: {:?}", stats);
        Ok(stats)
    }

    /// Copies the offscreen target back to the CPU as RGBA8 rows
    ///
    /// Blocks until the GPU has finished every submitted frame.
    pub fn read_frame(&self) -> Result<TextureData, RenderError> {
        let bytes_per_pixel = 4;
        let unpadded_row = self.width * bytes_per_pixel;
        let padded_row = unpadded_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Readback Buffer"),
            size: (padded_row * self.height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            self.color_target.size(),
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::MaintainBase::Wait);

        futures::executor::block_on(rx).map_err(|_| RenderError::ReadbackAbandoned)??;

        let is_bgra = matches!(
            self.color_target.format(),
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        let mapped = slice.get_mapped_range();
        let mut rgba = Vec::with_capacity((unpadded_row * self.height) as usize);
        for row in mapped.chunks_exact(padded_row as usize) {
            let row = &row[..unpadded_row as usize];
            if is_bgra {
                for pixel in row.chunks_exact(4) {
                    rgba.extend_from_slice(&[pixel[2], pixel[1], pixel[0], pixel[3]]);
                }
            } else {
                rgba.extend_from_slice(row);
            }
        }
        drop(mapped);
        staging_buffer.unmap();

        Ok(TextureData {
            width: self.width,
            height: self.height,
            rgba,
        })
    }

    fn prepare_draw(
        &mut self,
        draw: &DrawCommand,
        materials: &MaterialLibrary,
    ) -> Result<PreparedDraw, RenderError> {
        let material = materials.material(&draw.material)?;
        let program = material.shader().ok_or(MaterialError::ShaderNotInitialized)?;
        let block = material.stage_uniforms()?;

        let device = &self.device;
        let binding = self
            .materials
            .entry(draw.material.clone())
            .or_insert_with(|| {
                GpuMaterialBinding::new(device, &draw.material, material.uniform_size())
            });
        binding.flush(&self.queue, &block)?;
        let material_bind_group = binding.create_bind_group(
            device,
            &self.material_layout,
            &block,
            &self.textures,
            &self.fallback_texture,
        );

        let pipeline = program.key();
        self.pipeline_manager.get_or_create(device, program);

        let mesh = mesh_key(&draw.geometry);
        self.meshes
            .entry(mesh)
            .or_insert_with(|| upload_mesh(device, &draw.geometry));

        let model_layout = &self.model_layout;
        let model = self.models.entry(draw.node).or_insert_with(|| {
            let ubo = UniformBuffer::new(device);
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Model Bind Group"),
                layout: model_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.binding_resource(),
                }],
            });
            ModelBinding { ubo, bind_group }
        });
        model.ubo.update_content(&self.queue, draw.model.into());

        Ok(PreparedDraw {
            node: draw.node,
            mesh,
            pipeline,
            material_bind_group,
        })
    }
}

fn upload_mesh(device: &wgpu::Device, geometry: &SphereGeometry) -> GpuMesh {
    let data = geometry.build();
    let vertices = Vertex3D::interleave(&data);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Sphere Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Sphere Index Buffer"),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: data.indices.len() as u32,
    }
}

fn create_color_target(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Color Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_key_separates_tessellations() {
        let earth = SphereGeometry::new(2.5, 64, 64);
        let companion = SphereGeometry::new(2.5, 64, 64);
        let moon = SphereGeometry::new(1.0, 64, 64);
        let coarse = SphereGeometry::new(2.5, 16, 16);

        assert_eq!(mesh_key(&earth), mesh_key(&companion));
        assert_ne!(mesh_key(&earth), mesh_key(&moon));
        assert_ne!(mesh_key(&earth), mesh_key(&coarse));
    }
}
