use glam::Vec3;

use crate::{
    math::bounds::Aabb,
    model::Model,
    scene::mesh::{LitVertex, Mesh},
};

/// Flattens loaded model primitives into one lit mesh, scaled so the model
/// is `height` tall and standing on `base`.
///
/// Primitives whose material is plain white take `tint` instead, which is how
/// untextured exports usually look.
pub fn build_mesh(
    models: &[Model],
    base: Vec3,
    height: f32,
    tint: Vec3,
) -> anyhow::Result<Mesh<LitVertex>> {
    let bounds = Aabb::from_points(
        models
            .iter()
            .flat_map(|model| &model.primitives)
            .flat_map(|primitive| primitive.vertices.iter().map(|vertex| vertex.position)),
    )
    .ok_or_else(|| anyhow::anyhow!("Lamp post model has no vertices"))?;

    let transform = bounds.fit_to_height(base, height);

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for primitive in models.iter().flat_map(|model| &model.primitives) {
        let color = if primitive.base_color == Vec3::ONE {
            tint
        } else {
            primitive.base_color
        };

        let first_vertex = vertices.len() as u32;
        vertices.extend(primitive.vertices.iter().map(|vertex| {
            LitVertex::new(
                transform.transform_point3(vertex.position),
                color,
                vertex.normal,
            )
        }));
        indices.extend(primitive.indices.iter().map(|index| index + first_vertex));
    }

    Mesh::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelPrimitive, ModelVertex};

    fn triangle(offset: Vec3, color: Vec3) -> ModelPrimitive {
        ModelPrimitive {
            index: 0,
            vertices: [Vec3::ZERO, Vec3::X, Vec3::Y]
                .into_iter()
                .map(|p| ModelVertex {
                    position: p + offset,
                    normal: Vec3::Z,
                })
                .collect(),
            indices: vec![0, 1, 2],
            base_color: color,
        }
    }

    #[test]
    fn merges_primitives_and_fits_height() {
        let models = vec![Model {
            name: "Lamp".to_string(),
            primitives: vec![
                triangle(Vec3::ZERO, Vec3::ONE),
                triangle(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, 0.1, 0.1)),
            ],
        }];

        let base = Vec3::new(100.0, 0.0, 50.0);
        let mesh = build_mesh(&models, base, 60.0, Vec3::splat(0.3)).unwrap();

        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);

        let min_y = mesh.vertices.iter().map(|v| v.position.y).fold(f32::MAX, f32::min);
        let max_y = mesh.vertices.iter().map(|v| v.position.y).fold(f32::MIN, f32::max);
        assert!((min_y - 0.0).abs() < 1e-4);
        assert!((max_y - 60.0).abs() < 1e-4);

        assert_eq!(mesh.vertices[0].color, Vec3::splat(0.3));
        assert_eq!(mesh.vertices[3].color, Vec3::new(0.5, 0.1, 0.1));
    }

    #[test]
    fn empty_model_is_an_error() {
        assert!(build_mesh(&[], Vec3::ZERO, 1.0, Vec3::ONE).is_err());
    }
}
