//! # Sphere Generation
//!
//! UV sphere tessellation with normals and texture coordinates.

use super::GeometryData;
use std::f32::consts::PI;

/// Minimum longitude segments for a closed sphere
pub const MIN_WIDTH_SEGMENTS: u32 = 3;
/// Minimum latitude segments for a closed sphere
pub const MIN_HEIGHT_SEGMENTS: u32 = 2;

/// Generate a UV sphere centered at the origin
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `width_segments` - Number of longitude segments (clamped to at least 3)
/// * `height_segments` - Number of latitude segments (clamped to at least 2)
///
/// Produces `(width + 1) * (height + 1)` vertices; the seam column is
/// duplicated so texture coordinates wrap cleanly.
pub fn generate_sphere(radius: f32, width_segments: u32, height_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let width = width_segments.max(MIN_WIDTH_SEGMENTS);
    let height = height_segments.max(MIN_HEIGHT_SEGMENTS);

    for lat in 0..=height {
        let v = lat as f32 / height as f32;
        let theta = v * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=width {
            let u = long as f32 / width as f32;
            let phi = u * 2.0 * PI;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];

            data.vertices
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
            data.normals.push(normal);
            data.tex_coords.push([u, v]);
        }
    }

    let row = width + 1;
    for lat in 0..height {
        for long in 0..width {
            let first = lat * row + long;
            let second = first + row;

            // The pole rows collapse to a point, so skip their degenerate halves
            if lat != 0 {
                data.indices.extend_from_slice(&[first, second, first + 1]);
            }
            if lat != height - 1 {
                data.indices.extend_from_slice(&[second, second + 1, first + 1]);
            }
        }
    }

    data
}
