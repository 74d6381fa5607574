pub mod depth_dump;
pub mod frame_uniform;
pub mod lit_object;
pub mod object_uniform;
pub mod passes;
pub mod render_common;
pub mod render_ground;
pub mod render_mesh;
pub mod render_skybox;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
