pub mod components;
pub mod config;
pub mod error;
pub mod systems;

use anyhow::Context;
use components::{
    camera::{Camera, CameraComponent},
    location::Location,
    material::MaterialComponent,
    mesh::BodyDraw,
    render_pipelines::RenderPipelineComponent,
};
use config::Config;
use error::GraphicsError;
use systems::{
    assets::SceneTextures,
    billboard::{BillboardSystem, SpriteBatch},
    bodies::BodySystem,
    camera::CameraSystem,
    frame::{FrameClock, FrameLoop},
    material::MaterialSystem,
    mesh::MeshSystem,
    orbit_controls::OrbitController,
    picking,
    pipelines::SphereRenderPipelineSystem,
    scene::{self, SceneSettings},
    window::{PointerState, Viewport},
};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub trait Uniform {
    // only allow multiples of 16 bytes of buffer
    // data to be compliant with WebGL2.
    fn create_uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, data: &T) -> wgpu::Buffer;

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        buffer: &wgpu::Buffer,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup;
}

struct State {
    // renderer
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    // scene
    frame_loop: FrameLoop,
    frame_clock: FrameClock,
    pointer: PointerState,

    camera_component: CameraComponent,
    sphere_pipeline: RenderPipelineComponent,
    translucent_sphere_pipeline: RenderPipelineComponent,
    body_draws: Vec<BodyDraw>,
    body_materials: Vec<MaterialComponent>,
    sprite_batch: SpriteBatch,
}

impl State {
    async fn new(
        window: &Window,
        app_config: &Config,
        locations: &[Location],
    ) -> Result<Self, GraphicsError> {
        let size = window.inner_size();

        let instance = State::create_instance();

        // # Safety
        // The surface needs to live as long as the window that created it.
        // The window is moved into the event loop together with the state.
        let surface = unsafe { instance.create_surface(window) }?;
        let adapter = State::create_adapter(&instance, &surface).await?;
        let (device, queue) = State::create_device_and_queue(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface texture.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = MaterialSystem::create_depth_texture(&device, &config);
        tracing::info!(
            adapter = ?adapter.get_info().name,
            format = ?surface_format,
            width = config.width,
            height = config.height,
            "surface configured"
        );

        // scene
        let settings =
            SceneSettings::from_config(app_config, Viewport::new(config.width, config.height));
        let mut world = scene::build_world(locations, &settings);
        let textures = SceneTextures::load(&app_config.asset_dir).await;

        let texture_layout = MaterialSystem::create_2d_texture_bind_group_layout(&device);
        let model_layout = MeshSystem::create_model_matrix_bind_group_layout(&device);
        let camera_component =
            CameraSystem::create_camera_component(&device, world.resource::<Camera>());

        // bodies
        let sphere_shader =
            device.create_shader_module(wgpu::include_wgsl!("./shaders/sphere_shader.wgsl"));
        let sphere_layouts: &[&wgpu::BindGroupLayout] = &[
            &camera_component.camera_bind_group_layout,
            &texture_layout,
            &model_layout,
        ];
        let sphere_pipeline = SphereRenderPipelineSystem::create(
            &device,
            sphere_layouts,
            &sphere_shader,
            config.format,
            false,
        );
        let translucent_sphere_pipeline = SphereRenderPipelineSystem::create(
            &device,
            sphere_layouts,
            &sphere_shader,
            config.format,
            true,
        );
        let (body_draws, body_materials) = BodySystem::create_draws(
            &device,
            &queue,
            &mut world,
            &textures,
            &texture_layout,
            &model_layout,
        );

        // markers and labels
        let sprite_batch = BillboardSystem::create_sprite_batch(
            &device,
            &queue,
            &mut world,
            &textures.marker,
            &camera_component.camera_bind_group_layout,
            &texture_layout,
            config.format,
        );
        tracing::info!(locations = locations.len(), "scene ready");

        Ok(Self {
            size,
            surface,
            device,
            queue,
            config,
            depth_view,
            frame_loop: scene::frame_loop(world),
            frame_clock: FrameClock::default(),
            pointer: PointerState::default(),
            camera_component,
            sphere_pipeline,
            translucent_sphere_pipeline,
            body_draws,
            body_materials,
            sprite_batch,
        })
    }

    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    pub async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface,
    ) -> Result<wgpu::Adapter, GraphicsError> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GraphicsError::NoAdapter)
    }

    pub async fn create_device_and_queue(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), GraphicsError> {
        let device_and_queue = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    // WebGL doesn't support all of wgpu's features
                    limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    label: None,
                },
                None, // Trace path
            )
            .await?;
        Ok(device_and_queue)
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = MaterialSystem::create_depth_texture(&self.device, &self.config);

            let viewport = Viewport::new(new_size.width, new_size.height);
            let world = self.frame_loop.world_mut();
            world.insert_resource(viewport);
            world.resource_mut::<Camera>().aspect = viewport.aspect();
            tracing::debug!(width = new_size.width, height = new_size.height, "resized");
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.pointer.moved(x, y);
                let world = self.frame_loop.world_mut();
                let height = world.resource::<Viewport>().height;
                world
                    .resource_mut::<OrbitController>()
                    .drag_to(x, y, height);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.left();
                self.frame_loop
                    .world_mut()
                    .resource_mut::<OrbitController>()
                    .end_drag();
                true
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let Some((x, y)) = self.pointer.position() else {
                    return true;
                };
                let world = self.frame_loop.world_mut();
                match state {
                    ElementState::Pressed => {
                        world.resource_mut::<OrbitController>().begin_drag(x, y);
                    }
                    ElementState::Released => {
                        world.resource_mut::<OrbitController>().end_drag();
                        let picked = picking::handle_click(world, x, y);
                        tracing::debug!(x, y, hits = picked.len(), "click");
                    }
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.frame_loop
                    .world_mut()
                    .resource_mut::<OrbitController>()
                    .scroll(lines);
                true
            }
            _ => false,
        }
    }

    fn update(&mut self) {
        let delta = self.frame_clock.tick();
        self.frame_loop.advance(delta);

        let world = self.frame_loop.world();
        let camera = *world.resource::<Camera>();
        CameraSystem::write_camera(&self.queue, &mut self.camera_component, &camera);
        for draw in &self.body_draws {
            BodySystem::upload_transform(&self.queue, world, draw);
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        render_pass.set_bind_group(0, &self.camera_component.camera_bind_group, &[]);

        // opaque bodies are sorted ahead of the translucent cloud layer
        for draw in &self.body_draws {
            let Some(material) = self.body_materials.get(draw.material_index) else {
                continue;
            };
            let pipeline = if draw.translucent {
                &self.translucent_sphere_pipeline
            } else {
                &self.sphere_pipeline
            };
            render_pass.set_pipeline(&pipeline.render_pipeline);
            render_pass.set_bind_group(1, &material.bind_group, &[]);
            render_pass.set_bind_group(2, &draw.mesh.model_matrix_bind_group, &[]);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.mesh.num_indices, 0, 0..1);
        }

        let batch = &self.sprite_batch;
        render_pass.set_pipeline(&batch.render_pipeline.render_pipeline);
        render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
        render_pass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        for sprite in &batch.sprites {
            let Some(material) = batch.materials.get(sprite.material_index) else {
                continue;
            };
            render_pass.set_bind_group(1, &material.bind_group, &[]);
            render_pass.set_bind_group(2, &sprite.uniform_bind_group, &[]);
            render_pass.draw_indexed(0..batch.num_indices, 0, 0..1);
        }

        drop(render_pass);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub async fn run() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            console_error_panic_hook::set_once();
            tracing_wasm::set_as_global_default();
        } else {
            tracing_subscriber::fmt::init()
        }
    }

    if let Err(err) = try_run().await {
        tracing::error!(error = ?err, "geoglobe stopped");
    }
}

async fn try_run() -> anyhow::Result<()> {
    let app_config = Config::load();
    let locations = app_config
        .locations()
        .context("failed to load the locations to mark")?;
    tracing::info!(?app_config, locations = locations.len(), "starting");

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("geoglobe")
        .build(&event_loop)
        .context("failed to open a window")?;

    #[cfg(target_arch = "wasm32")]
    {
        // Winit prevents sizing with CSS, so we have to
        // set the size manually when on web.
        use winit::dpi::PhysicalSize;
        use winit::platform::web::WindowExtWebSys;

        let browser = web_sys::window().context("no browser window")?;
        let width = browser
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(1080.0);
        let height = browser
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(1080.0);
        window.set_inner_size(PhysicalSize::new(width as u32, height as u32));

        browser
            .document()
            .and_then(|doc| {
                let dst = doc.get_element_by_id("geoglobe")?;
                let canvas = web_sys::Element::from(window.canvas());
                dst.append_child(&canvas).ok()?;
                Some(())
            })
            .context("couldn't append canvas to the #geoglobe element")?;
    }

    let mut state = State::new(&window, &app_config, &locations)
        .await
        .context("failed to set up the renderer")?;

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == window.id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Escape),
                                ..
                            },
                        ..
                    } => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        // new_inner_size is &&mut so we have to dereference it twice
                        state.resize(**new_inner_size);
                    }
                    _ => {}
                }
            }
        }
        Event::RedrawRequested(window_id) if window_id == window.id() => {
            state.update();
            match state.render() {
                Ok(_) => {}
                // Reconfigure the surface if lost
                Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory");
                    *control_flow = ControlFlow::Exit
                }
                // Outdated and Timeout resolve by the next frame
                Err(e) => tracing::warn!(error = ?e, "dropped frame"),
            }
        }
        Event::MainEventsCleared => {
            // RedrawRequested will only trigger once, unless we manually
            // request it.
            window.request_redraw();
        }
        _ => {}
    });
}
