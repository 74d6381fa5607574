use crate::{
    rendering::{
        object_uniform::ObjectUniform, render_common::RenderCommon, render_mesh::RenderMesh,
        texture::ImageTexture,
    },
    scene::skybox::Skybox,
};

pub struct RenderSkybox {
    mesh: RenderMesh,
    uniform: ObjectUniform,
    texture: ImageTexture,
}

impl RenderSkybox {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        common: &RenderCommon,
        skybox: &Skybox,
        texture_path: &str,
    ) -> Self {
        let texture = ImageTexture::load_or_placeholder(
            device,
            queue,
            &common.image_bind_group_layout,
            texture_path,
            // Repeating would bleed the opposite edge of the atlas into the faces
            wgpu::AddressMode::ClampToEdge,
        );

        Self {
            mesh: RenderMesh::from_mesh(device, "Skybox", &Skybox::mesh()),
            uniform: ObjectUniform::new(
                device,
                &common.object_bind_group_layout,
                "Skybox",
                skybox.model_matrix(),
            ),
            texture,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, skybox: &Skybox) {
        self.uniform.update(queue, skybox.model_matrix());
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_bind_group(1, &self.uniform.bind_group, &[]);
        render_pass.set_bind_group(2, &self.texture.bind_group, &[]);
        self.mesh.draw(render_pass);
    }
}
