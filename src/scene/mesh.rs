use anyhow::bail;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Vertex of the unlit, textured objects (skybox and ground).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct TexturedVertex {
    pub position: Vec3,
    pub tex_coords: Vec2,
}

impl TexturedVertex {
    pub const fn new(position: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position: Vec3::from_array(position),
            tex_coords: Vec2::from_array(tex_coords),
        }
    }
}

/// Vertex of the lit objects: blocks, room, terrain and loaded models.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct LitVertex {
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
}

impl LitVertex {
    pub fn new(position: Vec3, color: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            color,
            normal,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone)]
pub struct Mesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> Mesh<V> {
    /// Builds a mesh, checking that the indices describe whole triangles that
    /// only reference existing vertices.
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> anyhow::Result<Self> {
        if indices.len() % 3 != 0 {
            bail!(
                "Index count {} is not a multiple of 3",
                indices.len()
            );
        }

        if let Some(index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            bail!(
                "Index {} out of range for {} vertices",
                index,
                vertices.len()
            );
        }

        Ok(Self { vertices, indices })
    }

    pub fn num_indices(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangles(&self) -> impl Iterator<Item = [&V; 3]> {
        self.indices.chunks_exact(3).map(|triangle| {
            [
                &self.vertices[triangle[0] as usize],
                &self.vertices[triangle[1] as usize],
                &self.vertices[triangle[2] as usize],
            ]
        })
    }
}

/// Face normal of a counter-clockwise triangle.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}
