//! Flattening the scene into draw commands
//!
//! Collection is pure CPU work over the scene graph and material library; the
//! [`RenderEngine`](super::RenderEngine) turns each command into GPU calls.

use cgmath::Matrix4;

use crate::gfx::{
    geometry::SphereGeometry,
    materials::{MaterialId, MaterialLibrary},
    scene::{NodeId, NodeKind, Scene},
};

/// One mesh to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub node: NodeId,
    pub model: Matrix4<f32>,
    pub geometry: SphereGeometry,
    /// Resolved material; unknown ids are replaced by the default material
    pub material: MaterialId,
}

/// Collects every visible mesh with its world matrix
///
/// A hidden node hides its whole subtree. Commands come out parents first.
pub fn collect_draws(scene: &Scene, materials: &MaterialLibrary) -> Vec<DrawCommand> {
    let mut draws = Vec::new();
    let mut hidden: Vec<NodeId> = Vec::new();

    scene.walk(|id, node, world| {
        let parent_hidden = node.parent().is_some_and(|parent| hidden.contains(&parent));
        if parent_hidden || !node.visible {
            hidden.push(id);
            return;
        }

        if let NodeKind::Mesh(mesh) = &node.kind {
            let material = materials.get_material_for_object(Some(mesh.material.as_str()));
            draws.push(DrawCommand {
                node: id,
                model: *world,
                geometry: mesh.geometry,
                material: material.name().to_string(),
            });
        }
    });

    draws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        materials::{BasicMaterial, BasicMaterialOptions, DEFAULT_MATERIAL_ID},
        scene::{Mesh, Node},
    };
    use cgmath::Vector3;

    #[test]
    fn test_hidden_subtree_is_skipped() {
        let mut scene = Scene::new();
        let mut materials = MaterialLibrary::new();
        materials.add_material(BasicMaterial::new("glow", BasicMaterialOptions::default()));

        let sun =
            scene.add_to_root(Node::mesh("Sun", Mesh::new(SphereGeometry::default(), "glow")));
        let orbit = scene.add(sun, Node::orbit("Orbit")).unwrap();
        let planet = scene
            .add(
                orbit,
                Node::mesh("Planet", Mesh::new(SphereGeometry::default(), "missing"))
                    .with_position(Vector3::new(3.0, 0.0, 0.0)),
            )
            .unwrap();

        let draws = collect_draws(&scene, &materials);
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].node, sun);
        assert_eq!(draws[0].material, "glow");
        assert_eq!(draws[1].node, planet);
        assert_eq!(draws[1].material, DEFAULT_MATERIAL_ID);
        assert_eq!(draws[1].model.w.x, 3.0);

        scene.node_mut(orbit).unwrap().visible = false;
        let draws = collect_draws(&scene, &materials);
        assert_eq!(draws.iter().map(|d| d.node).collect::<Vec<_>>(), vec![sun]);
    }
}
