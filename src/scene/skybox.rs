use glam::{Mat4, Vec3};

use crate::scene::mesh::{Mesh, TexturedVertex};

/// A large cube textured with a cross-layout atlas, kept centred on the
/// camera so it reads as distant background.
#[derive(Debug, Clone, Copy)]
pub struct Skybox {
    pub position: Vec3,
    pub scale: Vec3,
}

const fn v(position: [f32; 3], tex_coords: [f32; 2]) -> TexturedVertex {
    TexturedVertex::new(position, tex_coords)
}

// The atlas is laid out as a horizontal strip of four side faces in the
// middle row with the top and bottom faces above and below the second
// column. Rows stop just short of their neighbours to avoid sampling seams.
const SKYBOX_VERTICES: [TexturedVertex; 24] = [
    // Left
    v([-1.0, -1.0, 1.0], [0.25, 0.334]),
    v([-1.0, 1.0, 1.0], [0.25, 0.666]),
    v([1.0, 1.0, 1.0], [0.0, 0.666]),
    v([1.0, -1.0, 1.0], [0.0, 0.334]),
    // Right
    v([1.0, -1.0, -1.0], [0.75, 0.334]),
    v([1.0, 1.0, -1.0], [0.75, 0.666]),
    v([-1.0, 1.0, -1.0], [0.5, 0.666]),
    v([-1.0, -1.0, -1.0], [0.5, 0.334]),
    // Front
    v([-1.0, -1.0, -1.0], [0.5, 0.334]),
    v([-1.0, 1.0, -1.0], [0.5, 0.666]),
    v([-1.0, 1.0, 1.0], [0.25, 0.666]),
    v([-1.0, -1.0, 1.0], [0.25, 0.334]),
    // Behind
    v([1.0, -1.0, 1.0], [1.0, 0.334]),
    v([1.0, 1.0, 1.0], [1.0, 0.666]),
    v([1.0, 1.0, -1.0], [0.75, 0.666]),
    v([1.0, -1.0, -1.0], [0.75, 0.334]),
    // Top
    v([-1.0, 1.0, -1.0], [0.5, 0.667]),
    v([1.0, 1.0, -1.0], [0.5, 1.0]),
    v([1.0, 1.0, 1.0], [0.251, 1.0]),
    v([-1.0, 1.0, 1.0], [0.251, 0.667]),
    // Bottom
    v([1.0, -1.0, -1.0], [0.499, 0.0]),
    v([-1.0, -1.0, -1.0], [0.499, 0.334]),
    v([-1.0, -1.0, 1.0], [0.25, 0.334]),
    v([1.0, -1.0, 1.0], [0.25, 0.0]),
];

impl Skybox {
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::splat(scale),
        }
    }

    pub fn mesh() -> Mesh<TexturedVertex> {
        let indices = (0..6u32)
            .flat_map(|face| {
                let base = face * 4;
                [base, base + 1, base + 2, base, base + 2, base + 3]
            })
            .collect();

        Mesh {
            vertices: SKYBOX_VERTICES.to_vec(),
            indices,
        }
    }

    pub fn follow(&mut self, camera_position: Vec3) {
        self.position = camera_position;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quads() {
        let mesh = Skybox::mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(Mesh::new(mesh.vertices.clone(), mesh.indices.clone()).is_ok());
    }

    #[test]
    fn uvs_stay_inside_the_atlas() {
        for vertex in Skybox::mesh().vertices {
            assert!((0.0..=1.0).contains(&vertex.tex_coords.x));
            assert!((0.0..=1.0).contains(&vertex.tex_coords.y));
            assert_eq!(vertex.position.abs(), Vec3::ONE);
        }
    }

    #[test]
    fn follows_the_camera() {
        let mut skybox = Skybox::new(Vec3::ZERO, 500.0);
        skybox.follow(Vec3::new(10.0, 20.0, 30.0));

        let corner = skybox.model_matrix().transform_point3(Vec3::ONE);
        assert!(corner.abs_diff_eq(Vec3::new(510.0, 520.0, 530.0), 1e-3));
    }
}
