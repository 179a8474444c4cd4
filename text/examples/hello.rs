//! Renders "Hello Quill TextRenderer" into a window.
//!
//! An optional TOML configuration file is read from the path in `QUILL_CONFIG`.

use std::{env, sync::Arc};

use anyhow::{Context, Result};
use euclid::rect;
use futures::executor::block_on;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use quill_geometry::{Color, orthographic_projection};
use quill_renderer::{
    AtlasBinding, GlyphAtlas, PreparationContext, RenderContext, RenderDevice, TextBuffer,
    TextRenderer, TextRendererConfig, pods::AtlasInfo,
};
use quill_text::{FontFace, FontSystem, GlyphPacker, TextAnalyzer};

const TEXT: &str = "Hello Quill TextRenderer";
const FONT_SIZE: f32 = 36.0;
const DESIRED_MAXIMUM_FRAME_LATENCY: u32 = 2;

fn main() -> Result<()> {
    env_logger::init();

    let config = match env::var_os("QUILL_CONFIG") {
        Some(path) => TextRendererConfig::load(path)?,
        None => TextRendererConfig::default(),
    };
    info!("{config:?}");

    let event_loop = EventLoop::new()?;
    let mut app = HelloApp {
        config,
        window: None,
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct HelloApp {
    config: TextRendererConfig,
    window: Option<HelloWindow>,
}

impl ApplicationHandler for HelloApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match HelloWindow::new(event_loop, &self.config) {
            Ok(window) => self.window = Some(window),
            Err(e) => {
                error!("{e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = &mut self.window else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => window.resize(size),
            WindowEvent::RedrawRequested => match window.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    window.reconfigure_surface()
                }
                // The system is out of memory, we should probably quit
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => error!("{e:?}"),
            },
            _ => {}
        }
    }
}

struct HelloWindow {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    render_device: RenderDevice,
    renderer: TextRenderer,
    // Kept alive for the binding.
    _atlas: GlyphAtlas,
    atlas_binding: AtlasBinding,
    text_buffer: TextBuffer,
}

impl HelloWindow {
    fn new(event_loop: &ActiveEventLoop, config: &TextRendererConfig) -> Result<Self> {
        let attributes = Window::default_attributes()
            .with_title("Hello Quill")
            .with_inner_size(LogicalSize::new(960, 540));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Creating surface")?;
        let render_device = block_on(RenderDevice::for_surface(instance, &surface))?;

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: render_device.surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: render_device.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: DESIRED_MAXIMUM_FRAME_LATENCY,
        };
        surface.configure(&render_device.device, &surface_config);

        let device = &render_device.device;
        let queue = &render_device.queue;

        let renderer = TextRenderer::new(device, render_device.surface_format);
        let atlas = GlyphAtlas::new(device, config.atlas_size)?;
        let atlas_binding = renderer.bind_atlas(device, &atlas);

        let mut font_system = FontSystem::new();
        let mut packer = GlyphPacker::new(config.atlas_size);
        let mut text_buffer =
            TextBuffer::with_capacity(device, &renderer, config.initial_quad_capacity);

        text_buffer.append(
            &PreparationContext { device, queue },
            &mut TextAnalyzer {
                font_system: &mut font_system,
                packer: &mut packer,
                atlas: &atlas,
                queue,
            },
            &FontFace::sans_serif(),
            TEXT,
            FONT_SIZE,
            atlas.width(),
            rect(50.0, 50.0, 400.0, 400.0),
            Color::WHITE,
        )?;
        info!(
            "{} glyphs in {} quads",
            packer.packed_count(),
            text_buffer.quad_count()
        );

        window.request_redraw();

        Ok(Self {
            window,
            surface,
            surface_config,
            render_device,
            renderer,
            _atlas: atlas,
            atlas_binding,
            text_buffer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface_config.width = size.width.max(1);
        self.surface_config.height = size.height.max(1);
        self.reconfigure_surface();
        self.window.request_redraw();
    }

    fn reconfigure_surface(&self) {
        self.surface
            .configure(&self.render_device.device, &self.surface_config);
    }

    fn render(&self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = &self.render_device.device;
        let queue = &self.render_device.queue;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Hello Encoder"),
        });

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Hello Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut context = RenderContext {
                queue,
                projection: orthographic_projection(
                    self.surface_config.width as f32,
                    self.surface_config.height as f32,
                ),
                pass,
            };

            self.text_buffer.render(
                &mut context,
                &self.renderer,
                &self.atlas_binding,
                &AtlasInfo::new(self.atlas_binding.width()),
            );
        }

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }
}
