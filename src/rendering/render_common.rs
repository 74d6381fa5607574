use std::sync::RwLock;

use anyhow::Context;
use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

use crate::rendering::{frame_uniform::FrameUniform, object_uniform, texture};

/// Surface setup and the bind group layouts shared by all passes.
pub struct RenderCommon {
    pub output_surface_config: RwLock<SurfaceConfiguration>,
    pub surface_format: wgpu::TextureFormat,
    pub frame_uniform: FrameUniform,
    pub object_bind_group_layout: wgpu::BindGroupLayout,
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
    pub image_bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
    ) -> anyhow::Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("Surface is not supported by the adapter")?;

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);

        Ok(Self {
            output_surface_config: RwLock::new(output_surface_config),
            surface_format,
            frame_uniform: FrameUniform::new(device),
            object_bind_group_layout: object_uniform::create_bind_group_layout(device),
            shadow_bind_group_layout: texture::create_shadow_bind_group_layout(device),
            image_bind_group_layout: texture::create_image_bind_group_layout(device),
        })
    }
}
