use std::sync::Arc;

use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPass,
    RenderPassDescriptor, ShaderSource, StencilState,
};

use crate::rendering::{
    passes::pass::Pass,
    render_common::RenderCommon,
    render_mesh::{LIT_VERTEX_VBL, TEXTURED_VERTEX_VBL},
    shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
    texture::DepthTexture,
};

const SKYBOX_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Skybox",
    path: "skybox.wgsl",
};

const GROUND_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Ground",
    path: "ground.wgsl",
};

const LIT_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Lit",
    path: "lit.wgsl",
};

/// Draws the visible frame: skybox, ground tiles and lit objects.
pub struct ForwardPass {
    pub skybox_pipeline: PipelineId,
    pub ground_pipeline: PipelineId,
    pub lit_pipeline: PipelineId,
    common: Arc<RenderCommon>,
}

pub struct ForwardPassTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    pub clear_color: wgpu::Color,
}

struct PipelineOptions {
    label: &'static str,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    cull_mode: Option<wgpu::Face>,
    depth_write_enabled: bool,
    depth_compare: wgpu::CompareFunction,
}

fn add_forward_pipeline(
    cache_builder: &mut PipelineCacheBuilder,
    shader: ShaderDefinition,
    layout: wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    options: PipelineOptions,
) -> PipelineId {
    cache_builder.add_shader(
        shader,
        Box::new(
            move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(shader_def.name),
                    source: ShaderSource::Wgsl(source.into()),
                });

                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(options.label),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        buffers: &[options.vertex_layout.clone()],
                        compilation_options: PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: options.cull_mode,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DepthTexture::DEPTH_FORMAT,
                        depth_write_enabled: options.depth_write_enabled,
                        depth_compare: options.depth_compare,
                        stencil: StencilState::default(),
                        bias: DepthBiasState::default(),
                    }),
                    multisample: MultisampleState::default(),
                    multiview: None,
                    cache: None,
                });

                Ok(pipeline)
            },
        ),
    )
}

impl Pass for ForwardPass {
    type TextureViews = ForwardPassTextureViews;

    fn create(
        device: &Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<ForwardPass> {
        let skybox_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox pipeline layout"),
            bind_group_layouts: &[
                &common.frame_uniform.bind_group_layout,
                &common.object_bind_group_layout,
                &common.image_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let ground_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ground pipeline layout"),
            bind_group_layouts: &[
                &common.frame_uniform.bind_group_layout,
                &common.object_bind_group_layout,
                &common.shadow_bind_group_layout,
                &common.image_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit pipeline layout"),
            bind_group_layouts: &[
                &common.frame_uniform.bind_group_layout,
                &common.object_bind_group_layout,
                &common.shadow_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let format = common.surface_format;

        // Drawn first and always behind everything else, seen from inside
        let skybox_pipeline = add_forward_pipeline(
            cache_builder,
            SKYBOX_SHADER,
            skybox_layout,
            format,
            PipelineOptions {
                label: "Skybox pipeline",
                vertex_layout: TEXTURED_VERTEX_VBL,
                cull_mode: None,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
            },
        );

        let ground_pipeline = add_forward_pipeline(
            cache_builder,
            GROUND_SHADER,
            ground_layout,
            format,
            PipelineOptions {
                label: "Ground pipeline",
                vertex_layout: TEXTURED_VERTEX_VBL,
                cull_mode: Some(wgpu::Face::Back),
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        let lit_pipeline = add_forward_pipeline(
            cache_builder,
            LIT_SHADER,
            lit_layout,
            format,
            PipelineOptions {
                label: "Lit pipeline",
                vertex_layout: LIT_VERTEX_VBL,
                // Imported models do not agree on winding
                cull_mode: None,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        Ok(Self {
            skybox_pipeline,
            ground_pipeline,
            lit_pipeline,
            common,
        })
    }

    fn render<'a, F>(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        render_callback: F,
    ) where
        F: FnOnce(&mut RenderPass, &PipelineCache) + 'a,
    {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(texture_views.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &self.common.frame_uniform.bind_group, &[]);
        render_callback(&mut render_pass, pipeline_cache);
    }
}
