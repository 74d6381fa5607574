use id_arena::Id;

use crate::{
    rendering::{object_uniform::ObjectUniform, render_mesh::RenderMesh},
    scene::SceneObject,
};

pub type LitObjectId = Id<LitObject>;

/// GPU side of a [`SceneObject`].
pub struct LitObject {
    pub mesh: RenderMesh,
    pub uniform: ObjectUniform,
    pub casts_shadow: bool,
}

impl LitObject {
    pub fn from_scene_object(
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        object: &SceneObject,
    ) -> Self {
        Self {
            mesh: RenderMesh::from_mesh(device, &object.name, &object.mesh),
            uniform: ObjectUniform::new(device, object_layout, &object.name, object.transform),
            casts_shadow: object.casts_shadow,
        }
    }

    pub fn sync(&self, queue: &wgpu::Queue, object: &mut SceneObject) -> anyhow::Result<()> {
        self.uniform.update(queue, object.transform);

        if object.take_mesh_dirty() {
            self.mesh.update_vertices(queue, &object.mesh.vertices)?;
        }

        Ok(())
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_bind_group(1, &self.uniform.bind_group, &[]);
        self.mesh.draw(render_pass);
    }
}
