use glam::{Mat4, Vec3};

use crate::scene::mesh::{Mesh, TexturedVertex};

/// A square grid of ground tiles that stays centred on the camera's tile, so
/// the ground never runs out.
#[derive(Debug, Clone, Copy)]
pub struct GroundTiles {
    pub tile_size: f32,
    pub radius: i32,
}

impl GroundTiles {
    pub fn new(tile_size: f32, radius: i32) -> Self {
        Self {
            tile_size,
            radius: radius.max(0),
        }
    }

    pub fn tile_count(&self) -> usize {
        let side = (2 * self.radius + 1) as usize;
        side * side
    }

    /// Unit quad on the XZ plane facing +Y.
    pub fn tile_mesh() -> Mesh<TexturedVertex> {
        Mesh {
            vertices: vec![
                TexturedVertex::new([-0.5, 0.0, -0.5], [0.0, 0.0]),
                TexturedVertex::new([0.5, 0.0, -0.5], [1.0, 0.0]),
                TexturedVertex::new([0.5, 0.0, 0.5], [1.0, 1.0]),
                TexturedVertex::new([-0.5, 0.0, 0.5], [0.0, 1.0]),
            ],
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }

    /// Tile centres around the tile the camera is standing on.
    pub fn tile_positions(&self, camera_position: Vec3) -> Vec<Vec3> {
        let camera_tile_x = (camera_position.x / self.tile_size).floor() as i32;
        let camera_tile_z = (camera_position.z / self.tile_size).floor() as i32;

        let mut positions = Vec::with_capacity(self.tile_count());
        for x in -self.radius..=self.radius {
            for z in -self.radius..=self.radius {
                positions.push(Vec3::new(
                    (camera_tile_x + x) as f32 * self.tile_size,
                    0.0,
                    (camera_tile_z + z) as f32 * self.tile_size,
                ));
            }
        }

        positions
    }

    pub fn tile_model(&self, position: Vec3) -> Mat4 {
        Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(self.tile_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::face_normal;

    #[test]
    fn default_grid_is_three_by_three() {
        let ground = GroundTiles::new(500.0, 1);
        assert_eq!(ground.tile_count(), 9);
        assert_eq!(ground.tile_positions(Vec3::ZERO).len(), 9);
    }

    #[test]
    fn grid_recentres_on_camera_tile() {
        let ground = GroundTiles::new(500.0, 1);
        let positions = ground.tile_positions(Vec3::new(1250.0, 50.0, -730.0));

        // floor(2.5) = 2, floor(-1.46) = -2
        assert_eq!(positions[0], Vec3::new(500.0, 0.0, -1500.0));
        assert_eq!(positions[4], Vec3::new(1000.0, 0.0, -1000.0));
        assert_eq!(positions[8], Vec3::new(1500.0, 0.0, -500.0));
    }

    #[test]
    fn tiles_are_on_the_ground_plane() {
        let ground = GroundTiles::new(100.0, 2);
        let positions = ground.tile_positions(Vec3::new(-3.0, 999.0, 7.0));
        assert_eq!(positions.len(), 25);
        assert!(positions.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn tile_quad_faces_up() {
        let mesh = GroundTiles::tile_mesh();
        for [a, b, c] in mesh.triangles() {
            let normal = face_normal(a.position, b.position, c.position);
            assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn tile_model_spans_tile_size() {
        let ground = GroundTiles::new(500.0, 1);
        let model = ground.tile_model(Vec3::new(500.0, 0.0, 0.0));
        let corner = model.transform_point3(Vec3::new(0.5, 0.0, 0.5));
        assert!(corner.abs_diff_eq(Vec3::new(750.0, 0.0, 250.0), 1e-3));
    }
}
