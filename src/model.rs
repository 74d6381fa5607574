use std::path::Path;

use anyhow::{bail, Context};
use glam::{Mat3, Mat4, Vec3};
use gltf::buffer;
use itertools::izip;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub base_color: Vec3,
}

pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: Buffers,
    ) -> anyhow::Result<Model> {
        let mut model = Model {
            name: name.into(),
            primitives: Vec::new(),
        };

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                bail!("Unsupported primitive mode: {:?}", primitive.mode());
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let position_reader = reader
                .read_positions()
                .with_context(|| format!("{}: primitive without positions", model.name))?;
            let normal_reader = reader
                .read_normals()
                .with_context(|| format!("{}: primitive without normals", model.name))?;

            let vertices = izip!(position_reader, normal_reader)
                .map(|(position, normal)| ModelVertex {
                    position: Vec3::from(position),
                    normal: Vec3::from(normal),
                })
                .collect::<Vec<ModelVertex>>();

            let indices = match reader.read_indices() {
                Some(index_reader) => index_reader.into_u32().collect::<Vec<u32>>(),
                None => (0..vertices.len() as u32).collect(),
            };

            let [r, g, b, _] = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            model.primitives.push(ModelPrimitive {
                index: primitive.index(),
                vertices,
                indices,
                base_color: Vec3::new(r, g, b),
            });
        }

        if model.primitives.is_empty() {
            bail!("Mesh without primitives: {}", model.name);
        }

        Ok(model)
    }

    /// Applies a node transform to positions and normals.
    pub fn transformed(mut self, transform: Mat4) -> Model {
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

        for primitive in &mut self.primitives {
            for vertex in &mut primitive.vertices {
                vertex.position = transform.transform_point3(vertex.position);
                vertex.normal = (normal_matrix * vertex.normal).normalize_or_zero();
            }
        }

        self
    }
}

/// Loads every mesh of the default scene of a glTF file, with node
/// transforms baked into the vertices.
pub fn load_gltf(path: impl AsRef<Path>) -> anyhow::Result<Vec<Model>> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF file {}", path.display()))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes in gltf")?;

    let mut models = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut models)?;
    }

    if models.is_empty() {
        bail!("No meshes in {}", path.display());
    }

    Ok(models)
}

fn collect_node(
    node: &gltf::Node,
    parent_world_matrix: Mat4,
    buffers: Buffers,
    models: &mut Vec<Model>,
) -> anyhow::Result<()> {
    let local_matrix = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world_matrix = parent_world_matrix * local_matrix;

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .or(node.name())
            .map(String::from)
            .unwrap_or_else(|| format!("Mesh {}", mesh.index()));

        let model = Model::from_gltf(mesh_name, mesh, buffers)?;
        for primitive in &model.primitives {
            log::debug!(
                "{} primitive {}: {} vertices",
                model.name,
                primitive.index,
                primitive.vertices.len()
            );
        }
        models.push(model.transformed(world_matrix));
    }

    for child in node.children() {
        collect_node(&child, world_matrix, buffers, models)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transformed_moves_positions_and_rotates_normals() {
        let model = Model {
            name: "Test".to_string(),
            primitives: vec![ModelPrimitive {
                index: 0,
                vertices: vec![ModelVertex {
                    position: Vec3::X,
                    normal: Vec3::X,
                }],
                indices: vec![],
                base_color: Vec3::ONE,
            }],
        };

        let transform = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0))
            * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2)
            * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let model = model.transformed(transform);
        let vertex = model.primitives[0].vertices[0];

        assert!(vertex.position.abs_diff_eq(Vec3::new(0.0, 5.0, -2.0), 1e-5));
        assert!(vertex.normal.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    fn bounds(model: &Model) -> (Vec3, Vec3) {
        model
            .primitives
            .iter()
            .flat_map(|primitive| &primitive.vertices)
            .fold((Vec3::MAX, Vec3::MIN), |(min, max), vertex| {
                (min.min(vertex.position), max.max(vertex.position))
            })
    }

    #[test]
    fn lamp_post_children_carry_parent_transform() {
        let models = load_gltf("assets/models/lamp_post.gltf").unwrap();
        let names = models.iter().map(|model| model.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Pole", "Lamp"]);

        // The root node shifts both children by one unit along x
        let (min, max) = bounds(&models[0]);
        assert!(min.abs_diff_eq(Vec3::new(0.9, 0.0, -0.1), 1e-5));
        assert!(max.abs_diff_eq(Vec3::new(1.1, 4.0, 0.1), 1e-5));

        let (min, max) = bounds(&models[1]);
        assert!(min.abs_diff_eq(Vec3::new(0.6, 4.0, -0.4), 1e-5));
        assert!(max.abs_diff_eq(Vec3::new(1.4, 4.5, 0.4), 1e-5));
    }

    #[test]
    fn lamp_post_primitives_keep_normals_and_indices() {
        let models = load_gltf("assets/models/lamp_post.gltf").unwrap();

        let pole = &models[0].primitives[0];
        assert_eq!(pole.vertices.len(), 24);
        assert_eq!(pole.indices.len(), 36);
        assert!(pole.base_color.abs_diff_eq(Vec3::new(0.25, 0.25, 0.28), 1e-6));

        // Stored without an index buffer
        let lamp = &models[1].primitives[0];
        assert_eq!(lamp.vertices.len(), 36);
        assert_eq!(lamp.indices, (0..36).collect::<Vec<u32>>());

        for vertex in models.iter().flat_map(|model| &model.primitives[0].vertices) {
            assert!((vertex.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_gltf("does/not/exist.gltf").is_err());
    }
}
