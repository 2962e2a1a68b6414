//! Scene lights and the per-frame lighting summary gathered from them.

use cgmath::Vector3;

/// Converts a packed `0xRRGGBB` color into linear `[r, g, b]` in 0..=1
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Omnidirectional light emitted from its node's world position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl PointLight {
    pub fn new(hex: u32, intensity: f32) -> Self {
        Self {
            color: rgb_from_hex(hex),
            intensity,
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(0xffffff, 1.0)
    }
}

/// Constant background light, independent of position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(hex: u32, intensity: f32) -> Self {
        Self {
            color: rgb_from_hex(hex),
            intensity,
        }
    }

    /// Color premultiplied by intensity
    pub fn radiance(&self) -> [f32; 3] {
        [
            self.color[0] * self.intensity,
            self.color[1] * self.intensity,
            self.color[2] * self.intensity,
        ]
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::new(0xffffff, 1.0)
    }
}

/// A point light resolved to world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Every light in the scene, resolved for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLighting {
    pub point_lights: Vec<ResolvedPointLight>,
    /// Sum of all ambient lights' radiance
    pub ambient: [f32; 3],
}

/// Lighting data shared by every lit material in a frame
///
/// MUST match the `Lighting` struct in `phong.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub light_position: [f32; 4],
    pub light_color: [f32; 3],
    pub light_intensity: f32,
    pub ambient: [f32; 3],
    _padding: f32,
}

impl SceneLighting {
    /// Packs the first point light and the ambient term for the shader
    ///
    /// A scene without point lights yields a zero-intensity light.
    pub fn uniform(&self) -> LightingUniform {
        let mut uniform = LightingUniform {
            ambient: self.ambient,
            ..Default::default()
        };
        if let Some(light) = self.point_lights.first() {
            uniform.light_position = light.position.extend(1.0).into();
            uniform.light_color = light.color;
            uniform.light_intensity = light.intensity;
        }
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        assert_eq!(rgb_from_hex(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(rgb_from_hex(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgb_from_hex(0x000000), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_uniform_packs_first_point_light() {
        let lighting = SceneLighting {
            point_lights: vec![ResolvedPointLight {
                position: Vector3::new(1.0, 2.0, 3.0),
                color: [1.0, 1.0, 1.0],
                intensity: 3.0,
            }],
            ambient: [0.4, 0.4, 0.4],
        };

        let uniform = lighting.uniform();
        assert_eq!(uniform.light_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.light_intensity, 3.0);
        assert_eq!(uniform.ambient, [0.4, 0.4, 0.4]);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 48);
        assert_eq!(SceneLighting::default().uniform().light_intensity, 0.0);
    }

    #[test]
    fn test_ambient_radiance() {
        let light = AmbientLight::new(0xffffff, 0.4);
        assert_eq!(light.radiance(), [0.4, 0.4, 0.4]);
    }
}
