use glam::Mat4;
use id_arena::{Arena, Id};

use crate::{rendering::lit_object::LitObjectId, scene::mesh::{LitVertex, Mesh}};

pub type SceneObjectId = Id<SceneObject>;

/// A lit object in the world: the blocks, the room, the terrain and the lamp
/// post.
pub struct SceneObject {
    pub name: String,
    pub mesh: Mesh<LitVertex>,
    pub transform: Mat4,
    pub casts_shadow: bool,
    pub render_object: Option<LitObjectId>,
    mesh_dirty: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: Mesh<LitVertex>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform,
            casts_shadow: true,
            render_object: None,
            mesh_dirty: false,
        }
    }

    pub fn without_shadow(mut self) -> Self {
        self.casts_shadow = false;
        self
    }

    /// Replaces the vertices, keeping the index buffer. The vertex count must
    /// not change.
    pub fn update_vertices(&mut self, vertices: Vec<LitVertex>) {
        debug_assert_eq!(vertices.len(), self.mesh.vertices.len());
        self.mesh.vertices = vertices;
        self.mesh_dirty = true;
    }

    /// Returns whether the vertices changed since the last call.
    pub fn take_mesh_dirty(&mut self) -> bool {
        std::mem::take(&mut self.mesh_dirty)
    }
}

pub struct Scene {
    pub objects: Arena<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: SceneObject) -> SceneObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object_mut(&mut self, id: SceneObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn get_object_by_name(&self, name: &str) -> Option<SceneObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::scene::cornell_box;

    #[test]
    fn finds_objects_by_name() {
        let mut scene = Scene::new();
        let tall = scene.add_object(SceneObject::new(
            "Tall block",
            cornell_box::tall_block(),
            Mat4::IDENTITY,
        ));
        scene.add_object(SceneObject::new(
            "Short block",
            cornell_box::short_block(),
            Mat4::IDENTITY,
        ));

        assert_eq!(scene.get_object_by_name("Tall block"), Some(tall));
        assert!(scene.get_object_by_name("Lamp post").is_none());
    }

    #[test]
    fn vertex_updates_mark_mesh_dirty_once() {
        let mut object = SceneObject::new("Block", cornell_box::tall_block(), Mat4::IDENTITY);
        assert!(!object.take_mesh_dirty());

        let vertices = object.mesh.vertices.clone();
        object.update_vertices(vertices);
        assert!(object.take_mesh_dirty());
        assert!(!object.take_mesh_dirty());
    }
}
