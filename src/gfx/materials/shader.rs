//! Shader templates, feature flags and compiled programs
//!
//! A [`ShaderTemplate`] is static: WGSL source, the uniform names it exposes
//! with their byte offsets, and the feature flags it understands. Compiling it
//! against a material's [`ShaderDefines`] yields a [`ShaderProgram`], which is
//! what a material needs before it can upload uniforms.

use std::{borrow::Cow, collections::BTreeSet, collections::HashMap};

use log::debug;

use super::MaterialError;
use crate::gfx::resources::UniformLocation;

/// Diffuse texture present
pub const HAS_MAP: &str = "HAS_MAP";
/// Specular intensity texture present
pub const HAS_SPECULAR_MAP: &str = "HAS_SPECULAR_MAP";
/// Tangent-space normal texture present
pub const HAS_NORMAL_MAP: &str = "HAS_NORMAL_MAP";

/// Set of enabled shader feature flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderDefines {
    flags: BTreeSet<&'static str>,
}

impl ShaderDefines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, flag: &'static str) {
        self.flags.insert(flag);
    }

    pub fn is_set(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Enabled flags in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Static description of a shader family
#[derive(Debug)]
pub struct ShaderTemplate {
    pub name: &'static str,
    pub source: &'static str,
    /// Uniform names and their byte offsets in the uniform struct
    pub uniforms: &'static [(&'static str, u32)],
    /// Feature flags the source branches on
    pub features: &'static [&'static str],
}

/// A template compiled for one set of defines
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    name: &'static str,
    defines: ShaderDefines,
    locations: HashMap<&'static str, UniformLocation>,
    source: String,
}

impl ShaderProgram {
    /// Resolves uniform locations and prepends one WGSL `const` per feature flag
    pub fn compile(template: &ShaderTemplate, defines: &ShaderDefines) -> Self {
        let locations = template
            .uniforms
            .iter()
            .map(|&(name, offset)| (name, UniformLocation(offset)))
            .collect();

        let mut source = String::new();
        for feature in template.features {
            source.push_str(&format!(
                "const {}: bool = {};\n",
                feature,
                defines.is_set(feature)
            ));
        }
        source.push_str(template.source);

        debug!(
            "Compiled shader '{}' with defines {:?}",
            template.name,
            defines.iter().collect::<Vec<_>>()
        );

        Self {
            name: template.name,
            defines: defines.clone(),
            locations,
            source,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    /// WGSL source with the feature constants prepended
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn location(&self, uniform: &'static str) -> Result<UniformLocation, MaterialError> {
        self.locations
            .get(uniform)
            .copied()
            .ok_or(MaterialError::MissingUniform {
                shader: self.name,
                uniform,
            })
    }

    /// Identifies the template and define combination, e.g. `phong[HAS_MAP]`
    pub fn key(&self) -> String {
        format!(
            "{}[{}]",
            self.name,
            self.defines.iter().collect::<Vec<_>>().join(",")
        )
    }

    pub fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.name),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(self.source.as_str())),
        })
    }
}
