use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniformState {
    pub model: Mat4,
    /// Inverse transpose of the model's upper 3x3, padded to a mat4
    pub normal_matrix: Mat4,
}

impl ObjectUniformState {
    pub fn new(model: Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        Self {
            model,
            normal_matrix: Mat4::from_mat3(normal_matrix),
        }
    }
}

pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Object uniform bind group layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// Model transform of one draw, bound at group 1.
pub struct ObjectUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ObjectUniform {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        model: Mat4,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Object uniform buffer ({label})")),
            contents: bytemuck::cast_slice(&[ObjectUniformState::new(model)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Object uniform bind group ({label})")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self { buffer, bind_group }
    }

    pub fn update(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[ObjectUniformState::new(model)]),
        );
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn translation_does_not_affect_normals() {
        let state = ObjectUniformState::new(Mat4::from_translation(Vec3::new(5.0, -3.0, 2.0)));
        assert_eq!(state.normal_matrix, Mat4::IDENTITY);
        assert_eq!(std::mem::size_of::<ObjectUniformState>(), 128);
    }
}
