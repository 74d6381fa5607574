use std::f32::consts::PI;

use anyhow::ensure;
use glam::{Vec2, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::scene::mesh::{LitVertex, Mesh};

const LOW_COLOR: Vec3 = Vec3::new(0.25, 0.45, 0.18);
const HIGH_COLOR: Vec3 = Vec3::new(0.85, 0.82, 0.78);

/// Square vertex grid centred on the origin whose heights are perturbed at
/// runtime.
#[derive(Debug, Clone)]
pub struct Heightmap {
    resolution: usize,
    size: f32,
    heights: Vec<f32>,
}

impl Heightmap {
    pub fn new(resolution: usize, size: f32) -> anyhow::Result<Self> {
        ensure!(resolution >= 2, "Heightmap needs at least 2 vertices per side");
        ensure!(size > 0.0, "Heightmap size must be positive");

        Ok(Self {
            resolution,
            size,
            heights: vec![0.0; resolution * resolution],
        })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn spacing(&self) -> f32 {
        self.size / (self.resolution - 1) as f32
    }

    pub fn height(&self, x: usize, z: usize) -> f32 {
        self.heights[z * self.resolution + x]
    }

    pub fn max_abs_height(&self) -> f32 {
        self.heights.iter().fold(0.0f32, |max, h| max.max(h.abs()))
    }

    /// Horizontal position of a grid vertex.
    pub fn grid_position(&self, x: usize, z: usize) -> Vec2 {
        let half = self.size * 0.5;
        Vec2::new(
            x as f32 * self.spacing() - half,
            z as f32 * self.spacing() - half,
        )
    }

    /// Raises every vertex within `radius` of `center` by a cosine falloff
    /// that is `amplitude` at the centre and zero at the radius.
    pub fn apply_bump(&mut self, center: Vec2, radius: f32, amplitude: f32) {
        if radius <= 0.0 {
            return;
        }

        for z in 0..self.resolution {
            for x in 0..self.resolution {
                let distance = self.grid_position(x, z).distance(center);
                if distance < radius {
                    let falloff = 0.5 * (1.0 + (PI * distance / radius).cos());
                    self.heights[z * self.resolution + x] += amplitude * falloff;
                }
            }
        }
    }

    pub fn clamp_heights(&mut self, max_height: f32) {
        for height in &mut self.heights {
            *height = height.clamp(-max_height, max_height);
        }
    }

    /// Per-vertex normals from central differences, one-sided at the edges.
    pub fn normals(&self) -> Vec<Vec3> {
        let last = self.resolution - 1;
        let mut normals = Vec::with_capacity(self.heights.len());

        for z in 0..self.resolution {
            for x in 0..self.resolution {
                let (left, right) = (x.saturating_sub(1), (x + 1).min(last));
                let (back, front) = (z.saturating_sub(1), (z + 1).min(last));

                let dx = (right - left) as f32 * self.spacing();
                let dz = (front - back) as f32 * self.spacing();

                let slope_x = (self.height(right, z) - self.height(left, z)) / dx;
                let slope_z = (self.height(x, front) - self.height(x, back)) / dz;

                normals.push(Vec3::new(-slope_x, 1.0, -slope_z).normalize());
            }
        }

        normals
    }

    pub fn vertices(&self) -> Vec<LitVertex> {
        let normals = self.normals();
        let color_range = self.max_abs_height().max(1.0);

        (0..self.resolution)
            .flat_map(|z| (0..self.resolution).map(move |x| (x, z)))
            .zip(normals)
            .map(|((x, z), normal)| {
                let height = self.height(x, z);
                let position = self.grid_position(x, z);
                let t = (height / color_range).clamp(0.0, 1.0);

                LitVertex::new(
                    Vec3::new(position.x, height, position.y),
                    LOW_COLOR.lerp(HIGH_COLOR, t),
                    normal,
                )
            })
            .collect()
    }

    /// Two counter-clockwise (seen from above) triangles per grid cell.
    pub fn indices(&self) -> Vec<u32> {
        let n = self.resolution as u32;
        let mut indices = Vec::with_capacity(((n - 1) * (n - 1) * 6) as usize);

        for z in 0..n - 1 {
            for x in 0..n - 1 {
                let a = z * n + x;
                let b = a + 1;
                let c = a + n;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        indices
    }

    pub fn to_mesh(&self) -> Mesh<LitVertex> {
        Mesh {
            vertices: self.vertices(),
            indices: self.indices(),
        }
    }
}

/// Drops a random bump on the heightmap at a fixed interval.
#[derive(Debug)]
pub struct TerrainDeformer {
    pub interval: f32,
    pub radius: (f32, f32),
    pub amplitude: (f32, f32),
    pub max_height: f32,
    elapsed: f32,
    rng: StdRng,
}

impl TerrainDeformer {
    pub fn new(
        interval: f32,
        radius: (f32, f32),
        amplitude: (f32, f32),
        max_height: f32,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            interval,
            radius: ordered(radius),
            amplitude: ordered(amplitude),
            max_height,
            elapsed: 0.0,
            rng,
        }
    }

    /// Advances the timer and returns true when the heightmap was changed.
    pub fn update(&mut self, delta_time: f32, heightmap: &mut Heightmap) -> bool {
        self.elapsed += delta_time;
        if self.elapsed < self.interval {
            return false;
        }
        // Long stalls only produce one bump
        let carry_limit = (self.interval - f32::EPSILON).max(0.0);
        self.elapsed = (self.elapsed - self.interval).clamp(0.0, carry_limit);

        let half = heightmap.size() * 0.5;
        let center = Vec2::new(
            self.rng.gen_range(-half..=half),
            self.rng.gen_range(-half..=half),
        );
        let radius = self.rng.gen_range(self.radius.0..=self.radius.1);
        let amplitude = self.rng.gen_range(self.amplitude.0..=self.amplitude.1);

        heightmap.apply_bump(center, radius, amplitude);
        heightmap.clamp_heights(self.max_height);

        log::trace!(
            "Terrain bump at {:?}, radius {:.1}, amplitude {:.1}",
            center,
            radius,
            amplitude
        );

        true
    }
}

fn ordered((a, b): (f32, f32)) -> (f32, f32) {
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::face_normal;

    fn index_of(heightmap: &Heightmap, position: Vec2) -> (usize, usize) {
        let half = heightmap.size() * 0.5;
        let x = ((position.x + half) / heightmap.spacing()).round() as usize;
        let z = ((position.y + half) / heightmap.spacing()).round() as usize;
        (x, z)
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert!(Heightmap::new(1, 10.0).is_err());
        assert!(Heightmap::new(4, 0.0).is_err());
    }

    #[test]
    fn grid_is_centred() {
        let heightmap = Heightmap::new(5, 8.0).unwrap();
        assert_eq!(heightmap.grid_position(0, 0), Vec2::new(-4.0, -4.0));
        assert_eq!(heightmap.grid_position(2, 2), Vec2::ZERO);
        assert_eq!(heightmap.grid_position(4, 4), Vec2::new(4.0, 4.0));
    }

    #[test]
    fn bump_peaks_at_center() {
        let mut heightmap = Heightmap::new(21, 20.0).unwrap();
        heightmap.apply_bump(Vec2::ZERO, 5.0, 3.0);

        let (x, z) = index_of(&heightmap, Vec2::ZERO);
        assert!((heightmap.height(x, z) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn bump_does_not_reach_past_radius() {
        let mut heightmap = Heightmap::new(21, 20.0).unwrap();
        heightmap.apply_bump(Vec2::ZERO, 5.0, 3.0);

        for z in 0..heightmap.resolution() {
            for x in 0..heightmap.resolution() {
                if heightmap.grid_position(x, z).length() >= 5.0 {
                    assert_eq!(heightmap.height(x, z), 0.0);
                }
            }
        }
    }

    #[test]
    fn bump_falls_off_monotonically() {
        let mut heightmap = Heightmap::new(41, 40.0).unwrap();
        heightmap.apply_bump(Vec2::ZERO, 10.0, 5.0);

        let (center_x, center_z) = index_of(&heightmap, Vec2::ZERO);
        let profile: Vec<f32> = (center_x..heightmap.resolution())
            .map(|x| heightmap.height(x, center_z))
            .collect();

        assert!(profile.windows(2).all(|w| w[0] >= w[1]));
        // Half way out the cosine falloff is exactly half the amplitude
        assert!((profile[5] - 2.5).abs() < 1e-4);
    }

    #[test]
    fn clamps_heights() {
        let mut heightmap = Heightmap::new(11, 10.0).unwrap();
        heightmap.apply_bump(Vec2::ZERO, 4.0, 50.0);
        heightmap.apply_bump(Vec2::new(3.0, 3.0), 2.0, -50.0);
        heightmap.clamp_heights(10.0);
        assert!(heightmap.max_abs_height() <= 10.0);
    }

    #[test]
    fn flat_grid_normals_point_up() {
        let heightmap = Heightmap::new(8, 10.0).unwrap();
        assert!(heightmap
            .normals()
            .iter()
            .all(|n| n.abs_diff_eq(Vec3::Y, 1e-6)));
    }

    #[test]
    fn normals_lean_away_from_slope() {
        let mut heightmap = Heightmap::new(21, 20.0).unwrap();
        heightmap.apply_bump(Vec2::ZERO, 8.0, 4.0);

        let normals = heightmap.normals();
        let (x, z) = index_of(&heightmap, Vec2::new(3.0, 0.0));
        let normal = normals[z * heightmap.resolution() + x];
        assert!(normal.x > 0.0);
        assert!(normal.y > 0.0);
    }

    #[test]
    fn triangles_face_up() {
        let heightmap = Heightmap::new(4, 3.0).unwrap();
        let mesh = heightmap.to_mesh();

        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.indices.len(), 3 * 3 * 6);
        assert!(Mesh::new(mesh.vertices.clone(), mesh.indices.clone()).is_ok());

        for [a, b, c] in mesh.triangles() {
            let normal = face_normal(a.position, b.position, c.position);
            assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn deformer_waits_for_interval() {
        let mut heightmap = Heightmap::new(17, 100.0).unwrap();
        let mut deformer = TerrainDeformer::new(1.0, (10.0, 20.0), (5.0, 5.0), 50.0, Some(7));

        assert!(!deformer.update(0.4, &mut heightmap));
        assert!(!deformer.update(0.4, &mut heightmap));
        assert_eq!(heightmap.max_abs_height(), 0.0);

        assert!(deformer.update(0.4, &mut heightmap));
        assert!(heightmap.max_abs_height() > 0.0);
    }

    #[test]
    fn long_stall_produces_a_single_bump() {
        let mut heightmap = Heightmap::new(17, 100.0).unwrap();
        let mut deformer = TerrainDeformer::new(1.0, (10.0, 20.0), (5.0, 5.0), 50.0, Some(3));

        assert!(deformer.update(5.0, &mut heightmap));
        assert!(!deformer.update(0.0, &mut heightmap));
        assert!(deformer.update(0.1, &mut heightmap));
    }

    #[test]
    fn deformer_is_deterministic_with_seed() {
        let run = || {
            let mut heightmap = Heightmap::new(17, 100.0).unwrap();
            let mut deformer =
                TerrainDeformer::new(0.5, (10.0, 30.0), (-5.0, 10.0), 8.0, Some(42));
            for _ in 0..20 {
                deformer.update(0.5, &mut heightmap);
            }
            heightmap
        };

        let first = run();
        let second = run();
        assert!(first.max_abs_height() <= 8.0);
        for z in 0..first.resolution() {
            for x in 0..first.resolution() {
                assert_eq!(first.height(x, z), second.height(x, z));
            }
        }
    }
}
