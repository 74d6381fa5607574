use glam::Vec3;

use crate::{
    rendering::{
        object_uniform::ObjectUniform, render_common::RenderCommon, render_mesh::RenderMesh,
        texture::ImageTexture,
    },
    scene::ground::GroundTiles,
};

/// One quad mesh drawn once per tile, each draw with its own transform.
pub struct RenderGround {
    mesh: RenderMesh,
    tiles: Vec<ObjectUniform>,
    texture: ImageTexture,
}

impl RenderGround {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        common: &RenderCommon,
        ground: &GroundTiles,
        texture_path: &str,
    ) -> Self {
        let texture = ImageTexture::load_or_placeholder(
            device,
            queue,
            &common.image_bind_group_layout,
            texture_path,
            wgpu::AddressMode::Repeat,
        );

        let tiles = ground
            .tile_positions(Vec3::ZERO)
            .into_iter()
            .enumerate()
            .map(|(index, position)| {
                ObjectUniform::new(
                    device,
                    &common.object_bind_group_layout,
                    &format!("Ground tile {index}"),
                    ground.tile_model(position),
                )
            })
            .collect();

        Self {
            mesh: RenderMesh::from_mesh(device, "Ground tile", &GroundTiles::tile_mesh()),
            tiles,
            texture,
        }
    }

    /// Re-centres the tiles under the camera.
    pub fn update(&self, queue: &wgpu::Queue, ground: &GroundTiles, camera_position: Vec3) {
        for (tile, position) in self.tiles.iter().zip(ground.tile_positions(camera_position)) {
            tile.update(queue, ground.tile_model(position));
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_bind_group(3, &self.texture.bind_group, &[]);

        for tile in &self.tiles {
            render_pass.set_bind_group(1, &tile.bind_group, &[]);
            self.mesh.draw(render_pass);
        }
    }
}
