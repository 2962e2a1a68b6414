//! # Graphics Module
//!
//! Everything between the scene graph and the GPU.
//!
//! - **Scene** ([`scene`]) - node arena, transforms, lights
//! - **Geometry** ([`geometry`]) - procedural spheres
//! - **Materials** ([`materials`]) - Phong and basic materials, shader programs
//! - **Resources** ([`resources`]) - asynchronous textures, uniform staging, bind groups
//! - **Camera** ([`camera`]) - orbit camera for the renderer
//! - **Rendering** ([`rendering`]) - headless wgpu renderer
//!
//! Only [`camera`], [`rendering`] and parts of [`resources`] touch wgpu; the
//! rest runs without a GPU.

pub mod camera;
pub mod geometry;
pub mod materials;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::OrbitCamera;
pub use rendering::RenderEngine;
