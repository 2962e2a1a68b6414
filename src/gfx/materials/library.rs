//! Centralized material storage
//!
//! Meshes reference materials by [`MaterialId`] rather than owning them, so
//! several bodies can share one material and its compiled shader.

use std::collections::HashMap;

use log::debug;

use super::{Material, MaterialError, MaterialId, PhongMaterial, PhongMaterialOptions};

/// ID of the material every lookup falls back to
pub const DEFAULT_MATERIAL_ID: &str = "default";

/// Manages all materials in the scene
pub struct MaterialLibrary {
    materials: HashMap<MaterialId, Box<dyn Material>>,
    default_material: Box<dyn Material>,
}

impl MaterialLibrary {
    /// Creates a library holding only the default Phong material
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Box::new(PhongMaterial::new(
                DEFAULT_MATERIAL_ID,
                PhongMaterialOptions::default(),
            )),
        }
    }

    /// Adds a material under its own name, replacing any previous one
    pub fn add_material(&mut self, material: impl Material + 'static) -> MaterialId {
        let id = material.name().to_string();
        debug!("Adding material '{}'", id);
        self.materials.insert(id.clone(), Box::new(material));
        id
    }

    pub fn get_material(&self, id: &str) -> Option<&dyn Material> {
        if id == DEFAULT_MATERIAL_ID {
            return Some(self.default_material.as_ref());
        }
        self.materials.get(id).map(|material| material.as_ref())
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut (dyn Material + 'static)> {
        if id == DEFAULT_MATERIAL_ID {
            return Some(self.default_material.as_mut());
        }
        self.materials.get_mut(id).map(|material| material.as_mut())
    }

    /// Like [`get_material`](Self::get_material) but reports unknown ids
    pub fn material(&self, id: &str) -> Result<&dyn Material, MaterialError> {
        self.get_material(id)
            .ok_or_else(|| MaterialError::UnknownMaterial(id.to_string()))
    }

    pub fn get_default_material(&self) -> &dyn Material {
        self.default_material.as_ref()
    }

    /// Material for a mesh, falling back to the default when the id is
    /// missing or unknown
    pub fn get_material_for_object(&self, material_id: Option<&str>) -> &dyn Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or_else(|| self.get_default_material())
    }

    /// Lists all material IDs, default included, sorted
    pub fn list_materials(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.materials.keys().map(String::as_str).collect();
        ids.push(DEFAULT_MATERIAL_ID);
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.materials.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Compiles the shader of every material that lacks one
    ///
    /// Returns how many programs were compiled.
    pub fn init_shaders(&mut self) -> usize {
        let mut compiled = 0;
        for material in self
            .materials
            .values_mut()
            .chain(std::iter::once(&mut self.default_material))
        {
            if material.shader().is_none() {
                material.init_shader();
                compiled += 1;
            }
        }
        compiled
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}
