use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    config::{DemoVariant, WonderlandConfig},
    demo::DemoState,
    engine,
    rendering::renderer::Renderer,
};

struct App {
    renderer: Option<Renderer>,
    demo_state: DemoState,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn from_demo_state(demo_state: DemoState) -> Self {
        Self {
            renderer: None,
            demo_state,
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Renderer> {
        let window_config = &self.demo_state.config.window;
        let window_attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));

        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;

        if self.demo_state.variant() == DemoVariant::Wonderland {
            grab_cursor(&window);
        }

        let mut renderer = pollster::block_on(Renderer::new(Arc::new(window), &self.demo_state))?;
        renderer.load_scene(&mut self.demo_state)?;

        Ok(renderer)
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:?}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

    match grabbed {
        Ok(()) => window.set_cursor_visible(false),
        Err(e) => log::warn!("Could not grab cursor: {}", e),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                renderer.window.request_redraw();
                self.renderer = Some(renderer);
                self.last_frame = Instant::now();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.demo_state
                .handle_mouse_motion(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                renderer.resize(new_size);
            }
            WindowEvent::Focused(false) => {
                self.demo_state.input.release_all();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                self.demo_state.handle_key(key, state.is_pressed(), repeat);
                if self.demo_state.exit_requested {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let size = renderer.size;
                self.demo_state.handle_cursor_moved(
                    Vec2::new(position.x as f32, position.y as f32),
                    Vec2::new(size.width as f32, size.height as f32),
                );
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now - self.last_frame;
                self.last_frame = now;

                renderer.window.request_redraw();

                if let Err(e) = engine::update(&mut self.demo_state, delta_time) {
                    log::error!("Error during engine::update: {:?}", e);
                }

                match renderer.render(&mut self.demo_state) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Timeout");
                    }
                    Err(other) => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
            _ => (),
        }
    }
}

pub async fn run(config: WonderlandConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new(config).context("Failed to create demo state")?;
    let mut app = App::from_demo_state(demo_state);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
