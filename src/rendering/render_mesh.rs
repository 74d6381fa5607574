use std::mem::offset_of;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::scene::mesh::{LitVertex, Mesh, TexturedVertex};

/// Vertex and index buffers of one mesh.
pub struct RenderMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    num_vertices: usize,
}

impl RenderMesh {
    pub fn from_mesh<V: Pod>(device: &wgpu::Device, name: &str, mesh: &Mesh<V>) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Vertex buffer ({name})")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Index buffer ({name})")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.num_indices(),
            num_vertices: mesh.vertices.len(),
        }
    }

    /// Rewrites the vertex buffer in place. The vertex count must match the
    /// one the buffer was created with.
    pub fn update_vertices<V: Pod>(&self, queue: &wgpu::Queue, vertices: &[V]) -> anyhow::Result<()> {
        anyhow::ensure!(
            vertices.len() == self.num_vertices,
            "Vertex count changed from {} to {}",
            self.num_vertices,
            vertices.len()
        );

        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        Ok(())
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}

pub const TEXTURED_VERTEX_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(TexturedVertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(TexturedVertex, tex_coords) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        },
    ],
};

pub const LIT_VERTEX_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<LitVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(LitVertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(LitVertex, color) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(LitVertex, normal) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

/// Same buffers as [`LIT_VERTEX_VBL`], reading positions only.
pub const DEPTH_ONLY_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<LitVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        offset: offset_of!(LitVertex, position) as wgpu::BufferAddress,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_cover_whole_vertices() {
        assert_eq!(TEXTURED_VERTEX_VBL.array_stride, 20);
        assert_eq!(LIT_VERTEX_VBL.array_stride, 36);
        assert_eq!(LIT_VERTEX_VBL.attributes[2].offset, 24);
        assert_eq!(DEPTH_ONLY_VBL.array_stride, LIT_VERTEX_VBL.array_stride);
    }
}
