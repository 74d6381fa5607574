use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};
use wgpu::util::DeviceExt;

use crate::demo::DemoState;

/// Per-frame data shared by every pipeline, bound at group 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, Default)]
pub struct FrameUniformState {
    pub view_proj: Mat4,
    pub light_space: Mat4,
    pub camera_position: Vec4,
    pub light_position: Vec4,
    pub light_intensity: Vec4,
    // x: shadows enabled, y: depth bias, z: shadow far plane, w: exposure
    pub shadow_params: Vec4,
}

impl FrameUniformState {
    pub fn new(demo_state: &DemoState, resolution: Vec2) -> Self {
        let camera = demo_state.camera();
        let light = &demo_state.light;
        let shadow = &demo_state.config.shadow;

        Self {
            view_proj: camera.view_projection(resolution, &demo_state.projection),
            // Square shadow map
            light_space: light.light_space_matrix(1.0),
            camera_position: camera.eye.extend(1.0),
            light_position: light.position.extend(1.0),
            light_intensity: light.intensity.extend(0.0),
            shadow_params: Vec4::new(
                if demo_state.shadows_enabled() { 1.0 } else { 0.0 },
                shadow.bias,
                light.far,
                light.exposure,
            ),
        }
    }
}

pub struct FrameUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl FrameUniform {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame uniform buffer"),
            contents: bytemuck::cast_slice(&[FrameUniformState::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame uniform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: FrameUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DemoVariant, WonderlandConfig};

    #[test]
    fn layout_matches_shader_struct() {
        assert_eq!(std::mem::size_of::<FrameUniformState>(), 192);
    }

    #[test]
    fn shadow_flag_follows_variant() {
        let mut config = WonderlandConfig::default();
        config.lamp_post.enabled = false;
        let resolution = Vec2::new(1024.0, 768.0);

        let wonderland = DemoState::new(config.clone()).unwrap();
        let state = FrameUniformState::new(&wonderland, resolution);
        assert_eq!(state.shadow_params.x, 1.0);
        assert_eq!(state.shadow_params.y, config.shadow.bias);

        config.variant = DemoVariant::CornellWindow;
        let cornell = DemoState::new(config).unwrap();
        let state = FrameUniformState::new(&cornell, resolution);
        assert_eq!(state.shadow_params.x, 0.0);
        assert_eq!(state.light_position.truncate(), cornell.light.position);
    }
}
