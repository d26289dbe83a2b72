//! Window creation, event handling, and the per-frame driver.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it builds the GPU
//! context and scene once when the event loop resumes, then re-renders on
//! every `RedrawRequested`, advancing the animation clock exactly one tick
//! per frame.

use std::sync::Arc;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use tellurion_assets::TextureFetcher;
use tellurion_config::Config;
use tellurion_input::{MouseState, OrbitController, OrbitParams};
use tellurion_lighting::LightRig;
use tellurion_render::{
    Camera, DepthBuffer, FrameEncoder, RenderContext, RenderPassBuilder, SPACE_BLACK,
    SurfaceError, SurfaceWrapper, TextureManager, init_render_context_blocking,
};
use tellurion_scene::{SceneAssembly, SceneRenderer, assemble};
use tellurion_sim::SimState;
use tellurion_space::{StarfieldGenerator, StarfieldRenderer};

use crate::platform::PlatformDirs;
use crate::textures::load_scene_textures;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Application state: the window, GPU resources, scene, and simulation.
pub struct App {
    config: Config,
    dirs: PlatformDirs,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    surface_wrapper: SurfaceWrapper,
    camera: Camera,
    camera_buffer: Option<wgpu::Buffer>,
    depth_buffer: Option<DepthBuffer>,
    scene_renderer: Option<SceneRenderer>,
    star_renderer: Option<StarfieldRenderer>,
    assembly: Option<SceneAssembly>,
    sim: SimState,
    orbit: OrbitController,
    mouse: MouseState,
}

impl App {
    /// Create the application state. GPU resources are built lazily when the
    /// event loop resumes.
    pub fn new(config: Config, dirs: PlatformDirs) -> Self {
        let camera_config = &config.camera;
        let orbit = OrbitController::new(
            OrbitParams {
                rotate_speed: camera_config.rotate_speed,
                damping: camera_config.damping,
                min_distance: camera_config.min_distance,
                max_distance: camera_config.max_distance,
            },
            camera_config.distance,
        );

        let camera = Camera {
            position: orbit.position(),
            fov_y: camera_config.fov_y_degrees.to_radians(),
            near: camera_config.near,
            far: camera_config.far,
            ..Camera::default()
        };

        let surface_wrapper = SurfaceWrapper::new(
            config.window.width,
            config.window.height,
            1.0,
            config.render.max_pixel_ratio,
        );

        Self {
            config,
            dirs,
            window: None,
            gpu: None,
            surface_wrapper,
            camera,
            camera_buffer: None,
            depth_buffer: None,
            scene_renderer: None,
            star_renderer: None,
            assembly: None,
            sim: SimState::new(),
            orbit,
            mouse: MouseState::new(),
        }
    }

    /// The simulation state, for the per-frame driver.
    pub fn sim(&self) -> &SimState {
        &self.sim
    }

    /// Build all GPU resources. Everything in the scene graph exists before
    /// the first frame renders.
    fn initialize_rendering(&mut self, gpu: &RenderContext) {
        use wgpu::util::DeviceExt;

        let buffer = self.surface_wrapper.buffer_size();
        self.camera
            .set_aspect_ratio(buffer.width as f32, buffer.height as f32);
        self.camera.look_at(glam::Vec3::ZERO);

        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("camera-uniform"),
                contents: bytemuck::cast_slice(&[
                    self.camera.to_uniform(self.config.render.exposure)
                ]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let depth_buffer = DepthBuffer::new(&gpu.device, buffer.width, buffer.height);

        // Textures: fetched by URL, cached on disk, fallbacks on failure.
        let mut texture_manager = TextureManager::new(&gpu.device, self.config.render.anisotropy);
        let fetcher = TextureFetcher::new(
            self.dirs.cache_dir.join("textures"),
            self.config.textures.offline,
        );
        let scene_textures = load_scene_textures(
            &gpu.device,
            &gpu.queue,
            &mut texture_manager,
            &fetcher,
            &self.config.textures,
        );

        // Starfield: generated once from the seeded RNG.
        let sky = &self.config.sky;
        let stars = StarfieldGenerator::new(
            sky.seed,
            sky.star_count,
            sky.extent,
            sky.hue_min,
            sky.hue_max,
            sky.saturation,
        )
        .generate();
        let star_renderer =
            StarfieldRenderer::new(&gpu.device, gpu.surface_format, &camera_buffer, &stars);

        // Scene graph and the body renderer.
        let mut assembly = assemble();
        assembly.apply_angles(&self.sim.angles);
        let scene_renderer = SceneRenderer::new(
            &gpu.device,
            gpu.surface_format,
            &camera_buffer,
            &LightRig::default(),
            &scene_textures,
            texture_manager.surface_sampler(),
            self.config.render.shadow_map_size,
        );
        scene_renderer.update_transforms(&gpu.queue, &assembly);

        self.camera_buffer = Some(camera_buffer);
        self.depth_buffer = Some(depth_buffer);
        self.star_renderer = Some(star_renderer);
        self.scene_renderer = Some(scene_renderer);
        self.assembly = Some(assembly);

        info!("Scene initialized: {} stars, ready to render", stars.len());
    }

    /// Apply a surface resize event to the GPU resources and camera.
    fn apply_resize(&mut self, event: tellurion_render::SurfaceResizeEvent) {
        self.camera
            .set_aspect_ratio(event.logical_width as f32, event.logical_height as f32);

        if let Some(gpu) = &mut self.gpu {
            gpu.resize(event.buffer.width, event.buffer.height);
            if let Some(depth) = &mut self.depth_buffer {
                depth.resize(&gpu.device, event.buffer.width, event.buffer.height);
            }
        }

        info!(
            "Surface resized to {}x{} (scale {:.2}, render scale {:.2})",
            event.buffer.width, event.buffer.height, event.scale_factor, event.render_scale
        );
    }

    /// One frame: advance the clock, step the orbit, upload uniforms, and
    /// run the shadow, star, body, and cloud passes.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.sim.advance();
        if let Some(assembly) = &mut self.assembly {
            assembly.apply_angles(&self.sim.angles);
        }

        if self.mouse.is_button_pressed(MouseButton::Left) {
            self.orbit.apply_drag(self.mouse.delta());
        }
        self.orbit.apply_scroll(self.mouse.scroll());
        self.orbit.update();
        self.camera.position = self.orbit.position();
        self.camera.look_at(glam::Vec3::ZERO);
        self.mouse.clear_transients();

        let Some(gpu) = &self.gpu else { return };
        let (Some(camera_buffer), Some(depth), Some(scene), Some(stars), Some(assembly)) = (
            &self.camera_buffer,
            &self.depth_buffer,
            &self.scene_renderer,
            &self.star_renderer,
            &self.assembly,
        ) else {
            return;
        };

        gpu.queue.write_buffer(
            camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.to_uniform(self.config.render.exposure)]),
        );
        scene.update_transforms(&gpu.queue, assembly);

        let surface_texture = match gpu.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                // Recoverable: skip this frame.
                warn!("Surface acquire timed out, skipping frame");
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
                return;
            }
            Err(err) => {
                error!("Surface unusable: {err}");
                event_loop.exit();
                return;
            }
        };

        let mut frame = FrameEncoder::new(&gpu.device, Arc::new(gpu.queue.clone()), surface_texture);

        // Shadow pass first: Earth and Moon into the sun's depth map.
        scene.render_shadow_pass(frame.encoder_mut());

        // Main pass: stars, then opaque bodies, translucent clouds last.
        let depth_view = depth
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let builder = RenderPassBuilder::new()
            .label("scene-pass")
            .clear_color(SPACE_BLACK)
            .depth(depth_view, DepthBuffer::CLEAR_VALUE);
        {
            let mut pass = frame.begin_render_pass(&builder);
            stars.render(&mut pass);
            scene.render_opaque(&mut pass);
            scene.render_clouds(&mut pass);
        }
        frame.submit();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let scale_factor = window.scale_factor();
        let inner_size = window.inner_size();
        self.surface_wrapper = SurfaceWrapper::new(
            inner_size.width,
            inner_size.height,
            scale_factor,
            self.config.render.max_pixel_ratio,
        );
        info!(
            "Window created: {}x{} physical (scale {:.2})",
            inner_size.width, inner_size.height, scale_factor
        );

        // Context creation failure is the one fatal error here: nothing to
        // draw with.
        match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(mut gpu) => {
                // The context configured the surface at the raw window size;
                // re-apply with the clamped render scale.
                let buffer = self.surface_wrapper.buffer_size();
                gpu.resize(buffer.width, buffer.height);
                self.initialize_rendering(&gpu);
                self.gpu = Some(gpu);
            }
            Err(err) => {
                error!("GPU initialization failed: {err}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let new_inner = window.inner_size();
                    if let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        new_inner.width,
                        new_inner.height,
                    ) {
                        self.apply_resize(resize);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.mouse.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let tmp = std::env::temp_dir().join("tellurion-test-app");
        App::new(Config::default(), PlatformDirs::resolve_with_root(&tmp))
    }

    #[test]
    fn test_window_attributes_carry_config() {
        let mut config = Config::default();
        config.window.title = "Orrery".to_string();
        config.window.width = 640;
        config.window.height = 480;
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Orrery");
    }

    #[test]
    fn test_app_starts_at_tick_zero() {
        let app = test_app();
        assert_eq!(app.sim().clock.ticks(), 0);
        assert_eq!(app.sim().angles.earth, 0.0);
    }

    #[test]
    fn test_camera_starts_at_configured_distance() {
        let app = test_app();
        let distance = Config::default().camera.distance;
        assert!((app.camera.position.length() - distance).abs() < 1e-4);
        assert!((app.camera.fov_y - 75.0_f32.to_radians()).abs() < 1e-6);
    }
}
