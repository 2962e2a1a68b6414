//! # Vertex Data Structures
//!
//! GPU vertex format for sphere meshes.

use crate::gfx::geometry::GeometryData;

/// Interleaved vertex as uploaded to the vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Layout matching `VertexInput` in the shaders
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleaves the separate attribute streams of `data`
    pub fn interleave(data: &GeometryData) -> Vec<Vertex3D> {
        data.vertices
            .iter()
            .zip(&data.normals)
            .zip(&data.tex_coords)
            .map(|((&position, &normal), &tex_coords)| Vertex3D {
                position,
                normal,
                tex_coords,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::SphereGeometry;

    #[test]
    fn test_interleave_keeps_every_vertex() {
        let data = SphereGeometry::new(1.0, 8, 6).build();
        let vertices = Vertex3D::interleave(&data);

        assert_eq!(vertices.len(), data.vertex_count());
        assert_eq!(vertices[5].position, data.vertices[5]);
        assert_eq!(vertices[5].tex_coords, data.tex_coords[5]);
        assert_eq!(std::mem::size_of::<Vertex3D>(), 32);
    }
}
