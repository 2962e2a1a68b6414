//! Render pipeline cache keyed by compiled shader program
//!
//! Every material kind and define combination gets its own pipeline, created
//! lazily the first time a draw needs it. All pipelines share one layout:
//! frame globals, model transform, material.

use std::collections::HashMap;

use log::debug;
use wgpu::*;

use super::vertex::Vertex3D;
use crate::gfx::{materials::ShaderProgram, resources::TextureResource};

/// Render state shared by every pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub color_format: TextureFormat,
    pub cull_mode: Option<Face>,
    pub depth_test: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            color_format: TextureFormat::Rgba8UnormSrgb,
            cull_mode: Some(Face::Back),
            depth_test: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }
}

pub struct PipelineManager {
    config: PipelineConfig,
    layout: PipelineLayout,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    /// Creates the shared layout from the global, model and material group layouts
    pub fn new(
        device: &Device,
        bind_group_layouts: &[&BindGroupLayout],
        config: PipelineConfig,
    ) -> Self {
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        Self {
            config,
            layout,
            pipelines: HashMap::new(),
        }
    }

    /// Returns the pipeline for `program`, creating it on first use
    pub fn get_or_create(&mut self, device: &Device, program: &ShaderProgram) -> &RenderPipeline {
        let key = program.key();
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.create_pipeline(device, program, &key);
            debug!("Created pipeline '{}'", key);
            self.pipelines.insert(key.clone(), pipeline);
        }
        &self.pipelines[&key]
    }

    pub fn get(&self, key: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    pub fn has_pipeline(&self, key: &str) -> bool {
        self.pipelines.contains_key(key)
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
        }
    }

    fn create_pipeline(
        &self,
        device: &Device,
        program: &ShaderProgram,
        label: &str,
    ) -> RenderPipeline {
        let shader = program.create_module(device);

        let depth_stencil = self.config.depth_test.then(|| DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&self.layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: self.config.color_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: self.config.cull_mode,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

/// Statistics about pipeline manager state
#[derive(Debug)]
pub struct PipelineStats {
    pub total_pipelines: usize,
}
