pub mod cornell_box;
pub mod ground;
pub mod heightmap;
pub mod lamp_post;
pub mod mesh;
pub mod scene_object;
pub mod skybox;

pub use scene_object::{Scene, SceneObject, SceneObjectId};
