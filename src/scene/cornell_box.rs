//! Geometry of the Cornell box and its two blocks.
//!
//! Coordinates follow the measured data of the original Cornell box, with x
//! mirrored so the room sits in the -x, -z quadrant. Each object is five
//! quads: the blocks leave out their invisible bottom face, the room leaves
//! out the wall facing the camera.

use glam::Vec3;

use crate::scene::mesh::{LitVertex, Mesh};

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const RED: [f32; 3] = [1.0, 0.0, 0.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];

const QUAD_INDICES: [u32; 30] = [
    0, 1, 2, 0, 2, 3, //
    4, 5, 6, 4, 6, 7, //
    8, 9, 10, 8, 10, 11, //
    12, 13, 14, 12, 14, 15, //
    16, 17, 18, 16, 18, 19,
];

/// Five quads, each with one normal and one colour.
struct QuadSet {
    positions: [[f32; 3]; 20],
    normals: [[f32; 3]; 5],
    colors: [[f32; 3]; 5],
}

impl QuadSet {
    fn into_mesh(self, scale: f32) -> Mesh<LitVertex> {
        let vertices = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let quad = i / 4;
                LitVertex::new(
                    Vec3::from_array(*position) * scale,
                    Vec3::from_array(self.colors[quad]),
                    Vec3::from_array(self.normals[quad]).normalize(),
                )
            })
            .collect();

        Mesh {
            vertices,
            indices: QUAD_INDICES.to_vec(),
        }
    }
}

/// Floor, ceiling, red left wall, green right wall and back wall.
pub fn room() -> Mesh<LitVertex> {
    QuadSet {
        positions: [
            // Floor
            [-552.8, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, -559.2],
            [-549.6, 0.0, -559.2],
            // Ceiling
            [-556.0, 548.8, 0.0],
            [-556.0, 548.8, -559.2],
            [0.0, 548.8, -559.2],
            [0.0, 548.8, 0.0],
            // Left wall
            [-552.8, 0.0, 0.0],
            [-549.6, 0.0, -559.2],
            [-556.0, 548.8, -559.2],
            [-556.0, 548.8, 0.0],
            // Right wall
            [0.0, 0.0, -559.2],
            [0.0, 0.0, 0.0],
            [0.0, 548.8, 0.0],
            [0.0, 548.8, -559.2],
            // Back wall
            [-549.6, 0.0, -559.2],
            [0.0, 0.0, -559.2],
            [0.0, 548.8, -559.2],
            [-556.0, 548.8, -559.2],
        ],
        normals: [
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        colors: [WHITE, WHITE, RED, GREEN, WHITE],
    }
    .into_mesh(1.0)
}

fn tall_block_quads() -> QuadSet {
    QuadSet {
        positions: [
            // Top
            [-423.0, 330.0, -247.0],
            [-265.0, 330.0, -296.0],
            [-314.0, 330.0, -456.0],
            [-472.0, 330.0, -406.0],
            // Sides
            [-423.0, 0.0, -247.0],
            [-423.0, 330.0, -247.0],
            [-472.0, 330.0, -406.0],
            [-472.0, 0.0, -406.0],
            //
            [-472.0, 0.0, -406.0],
            [-472.0, 330.0, -406.0],
            [-314.0, 330.0, -456.0],
            [-314.0, 0.0, -456.0],
            //
            [-314.0, 0.0, -456.0],
            [-314.0, 330.0, -456.0],
            [-265.0, 330.0, -296.0],
            [-265.0, 0.0, -296.0],
            //
            [-265.0, 0.0, -296.0],
            [-265.0, 330.0, -296.0],
            [-423.0, 330.0, -247.0],
            [-423.0, 0.0, -247.0],
        ],
        normals: [
            [0.0, 1.0, 0.0],
            [0.956, 0.0, 0.295],
            [0.302, 0.0, -0.953],
            [-0.955, 0.0, -0.293],
            [-0.296, 0.0, 0.955],
        ],
        colors: [WHITE; 5],
    }
}

pub fn tall_block() -> Mesh<LitVertex> {
    tall_block_quads().into_mesh(1.0)
}

pub fn short_block() -> Mesh<LitVertex> {
    QuadSet {
        positions: [
            // Top
            [-130.0, 165.0, -65.0],
            [-82.0, 165.0, -225.0],
            [-240.0, 165.0, -272.0],
            [-290.0, 165.0, -114.0],
            // Sides
            [-290.0, 0.0, -114.0],
            [-290.0, 165.0, -114.0],
            [-240.0, 165.0, -272.0],
            [-240.0, 0.0, -272.0],
            //
            [-130.0, 0.0, -65.0],
            [-130.0, 165.0, -65.0],
            [-290.0, 165.0, -114.0],
            [-290.0, 0.0, -114.0],
            //
            [-82.0, 0.0, -225.0],
            [-82.0, 165.0, -225.0],
            [-130.0, 165.0, -65.0],
            [-130.0, 0.0, -65.0],
            //
            [-240.0, 0.0, -272.0],
            [-240.0, 165.0, -272.0],
            [-82.0, 165.0, -225.0],
            [-82.0, 0.0, -225.0],
        ],
        normals: [
            [0.0, 1.0, 0.0],
            [0.953, 0.0, 0.302],
            [0.293, 0.0, -0.957],
            [-0.958, 0.0, -0.287],
            [-0.285, 0.0, 0.958],
        ],
        colors: [WHITE; 5],
    }
    .into_mesh(1.0)
}

/// The tall block at a quarter of its size, standing in the open world of the
/// main scene where it casts the shadow.
pub fn wonderland_block() -> Mesh<LitVertex> {
    tall_block_quads().into_mesh(0.25)
}
