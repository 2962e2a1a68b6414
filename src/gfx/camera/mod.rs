//! Viewpoint for the headless renderer

pub mod orbit_camera;

pub use orbit_camera::{OrbitCamera, OrbitCameraBounds};

use cgmath::{Matrix4, SquareMatrix};

/// Camera data shared with every shader
///
/// MUST match the `Camera` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position in homogeneous coordinates, for 16 byte alignment
    pub view_position: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            view_position: [0.0; 4],
        }
    }
}
