use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    demo::DemoState,
    rendering::{
        depth_dump,
        frame_uniform::FrameUniformState,
        lit_object::LitObject,
        passes::{
            forward_pass::{ForwardPass, ForwardPassTextureViews},
            pass::Pass,
            shadow_pass::{ShadowPass, ShadowPassTextureViews},
        },
        render_common::RenderCommon,
        render_ground::RenderGround,
        render_skybox::RenderSkybox,
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::{DepthTexture, ShadowMap},
    },
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    shadow_map: ShadowMap,

    skybox: Option<RenderSkybox>,
    ground: Option<RenderGround>,
    lit_objects: Arena<LitObject>,

    shader_loader: ShaderLoader,

    shadow_pass: ShadowPass,
    forward_pass: ForwardPass,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, demo_state: &DemoState) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request device")?;

        let common = Arc::new(RenderCommon::new(&device, &adapter, &surface, size)?);

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");
        let shadow_map = ShadowMap::new(
            &device,
            &common.shadow_bind_group_layout,
            demo_state.config.shadow.map_size,
        );
        log::debug!("Shadow map {0}x{0}", shadow_map.size);

        let mut cache_builder = PipelineCacheBuilder::new();

        let shadow_pass = ShadowPass::create(&device, common.clone(), &mut cache_builder)?;
        let forward_pass = ForwardPass::create(&device, common.clone(), &mut cache_builder)?;

        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        Ok(Self {
            window: window.clone(),
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            shadow_map,
            skybox: None,
            ground: None,
            lit_objects: Arena::new(),
            shader_loader,
            shadow_pass,
            forward_pass,
        })
    }

    /// Uploads every object of the demo and links scene objects to their GPU
    /// counterparts.
    pub fn load_scene(&mut self, demo_state: &mut DemoState) -> anyhow::Result<()> {
        let config = &demo_state.config;

        self.skybox = demo_state.skybox.as_ref().map(|skybox| {
            RenderSkybox::new(
                &self.device,
                &self.queue,
                &self.common,
                skybox,
                &config.skybox.texture,
            )
        });

        self.ground = demo_state.ground.as_ref().map(|ground| {
            RenderGround::new(
                &self.device,
                &self.queue,
                &self.common,
                ground,
                &config.ground.texture,
            )
        });

        for (_id, scene_object) in demo_state.scene.objects.iter_mut() {
            let lit_object = LitObject::from_scene_object(
                &self.device,
                &self.common.object_bind_group_layout,
                scene_object,
            );
            scene_object.render_object = Some(self.lit_objects.alloc(lit_object));

            log::info!(
                "Loaded {} with {} triangles",
                scene_object.name,
                scene_object.mesh.num_indices() / 3
            );
        }

        Ok(())
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let Ok(mut config) = self.common.output_surface_config.write() else {
            log::error!("Surface config lock poisoned");
            return;
        };

        self.size = new_size;
        config.width = new_size.width;
        config.height = new_size.height;
        self.depth_texture.resize(&self.device, new_size);
        self.surface.configure(&self.device, &config);
    }

    fn resolution(&self) -> Vec2 {
        Vec2::new(self.size.width as f32, self.size.height as f32)
    }

    fn update_uniforms(&self, demo_state: &mut DemoState) {
        self.common.frame_uniform.update(
            &self.queue,
            FrameUniformState::new(demo_state, self.resolution()),
        );

        if let (Some(render_skybox), Some(skybox)) = (&self.skybox, &demo_state.skybox) {
            render_skybox.update(&self.queue, skybox);
        }

        if let (Some(render_ground), Some(ground)) = (&self.ground, &demo_state.ground) {
            render_ground.update(&self.queue, ground, demo_state.camera().eye);
        }

        for (_id, scene_object) in demo_state.scene.objects.iter_mut() {
            let Some(lit_object) = scene_object
                .render_object
                .and_then(|id| self.lit_objects.get(id))
            else {
                continue;
            };

            if let Err(e) = lit_object.sync(&self.queue, scene_object) {
                log::error!("Failed to update {}: {:?}", scene_object.name, e);
            }
        }
    }

    pub fn render(&mut self, demo_state: &mut DemoState) -> Result<(), wgpu::SurfaceError> {
        if let Err(e) = self.shader_loader.load_pending_shaders() {
            log::error!("Failed to load pending shaders: {:?}", e);
        }

        self.update_uniforms(demo_state);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;
        let shadows_enabled = demo_state.shadows_enabled();

        self.shadow_pass.render(
            &ShadowPassTextureViews {
                depth: self.shadow_map.view().clone(),
            },
            &mut encoder,
            pipeline_cache,
            |render_pass, _pipeline_cache| {
                if !shadows_enabled {
                    return;
                }

                render_pass.set_bind_group(0, &self.common.frame_uniform.bind_group, &[]);
                for (_id, lit_object) in self.lit_objects.iter() {
                    if lit_object.casts_shadow {
                        lit_object.draw(render_pass);
                    }
                }
            },
        );

        let [r, g, b] = demo_state.config.window.clear_color;

        self.forward_pass.render(
            &ForwardPassTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
                clear_color: wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: 1.0,
                },
            },
            &mut encoder,
            pipeline_cache,
            |render_pass, pipeline_cache| {
                if let (Some(skybox), Some(pipeline)) = (
                    &self.skybox,
                    pipeline_cache.get(self.forward_pass.skybox_pipeline),
                ) {
                    render_pass.set_pipeline(pipeline);
                    skybox.draw(render_pass);
                }

                // Replaces the skybox texture at group 2
                render_pass.set_bind_group(2, &self.shadow_map.bind_group, &[]);

                if let (Some(ground), Some(pipeline)) = (
                    &self.ground,
                    pipeline_cache.get(self.forward_pass.ground_pipeline),
                ) {
                    render_pass.set_pipeline(pipeline);
                    ground.draw(render_pass);
                }

                if let Some(pipeline) = pipeline_cache.get(self.forward_pass.lit_pipeline) {
                    render_pass.set_pipeline(pipeline);

                    for (_id, lit_object) in self.lit_objects.iter() {
                        lit_object.draw(render_pass);
                    }
                }
            },
        );

        self.queue.submit([encoder.finish()]);

        output.present();

        if std::mem::take(&mut demo_state.depth_dump_requested) {
            let path = &demo_state.config.shadow.depth_dump_path;
            if let Err(e) =
                depth_dump::dump_depth_texture(&self.device, &self.queue, self.shadow_map.texture(), path)
            {
                log::error!("Failed to dump depth map: {:?}", e);
            }
        }

        Ok(())
    }
}
