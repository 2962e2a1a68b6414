//! # Procedural Geometry
//!
//! Sphere descriptors for planet bodies and the vertex data generated from them.
//!
//! Meshes in the scene graph only store a [`SphereGeometry`] descriptor. The
//! vertex data is produced on demand with [`SphereGeometry::build`], so a scene
//! can be composed and animated without ever touching vertex buffers.
//!
//! ```rust
//! use orrery::gfx::geometry::SphereGeometry;
//!
//! let earth = SphereGeometry::new(2.5, 64, 64);
//! let data = earth.build();
//! assert_eq!(data.vertex_count(), 65 * 65);
//! ```

pub mod primitives;

pub use primitives::*;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Sphere descriptor: radius plus tessellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments,
            height_segments,
        }
    }

    /// Generates vertex data for this sphere.
    pub fn build(&self) -> GeometryData {
        generate_sphere(self.radius, self.width_segments, self.height_segments)
    }
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self::new(5.0, 64, 64)
    }
}
