//! Simulation builder and window runner.
//!
//! Workers ask for paints through an [`EventLoopProxy`]; the window turns
//! every [`Repaint`] into `request_redraw`, which the platform coalesces, and
//! paints the whole store on `RedrawRequested`. Closing the window shuts the
//! worker pool down before the event loop exits.

use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::config::Config;
use crate::error::SimulationError;
use crate::gpu::GpuSurface;
use crate::lifecycle::Controller;
use crate::render::{Color, RepaintRequester};
use crate::time::FrameClock;

/// User event a worker sends after each pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repaint;

impl RepaintRequester for EventLoopProxy<Repaint> {
    fn request_repaint(&self) {
        // Fails only once the event loop has closed; nothing left to paint.
        let _ = self.send_event(Repaint);
    }
}

/// A jitter field simulation builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```no_run
/// use jitterfield::Simulation;
///
/// Simulation::new()
///     .with_particle_count(5000)
///     .with_worker_count(8)
///     .run()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    config: Config,
}

impl Simulation {
    /// Create a new simulation with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the canvas size in pixels; this is also the initial window size.
    pub fn with_canvas_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Set the number of worker threads.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Set the largest per-axis offset of one step.
    pub fn with_jitter(mut self, jitter: i32) -> Self {
        self.config.jitter = jitter;
        self
    }

    /// Set the pause between two passes of one worker.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.config.frame_interval = interval;
        self
    }

    /// Set the side of each particle mark in pixels.
    pub fn with_mark_size(mut self, size: u32) -> Self {
        self.config.style.size = size;
        self
    }

    /// Set the background and particle colors.
    pub fn with_colors(mut self, background: Color, particle: Color) -> Self {
        self.config.style.background = background;
        self.config.style.color = particle;
        self
    }

    /// Fix the run seed so the initial layout and every step are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the simulation. Blocks until the window is closed and every
    /// worker has terminated.
    pub fn run(self) -> Result<(), SimulationError> {
        let controller = Controller::from_config(&self.config)?;
        log::info!(
            "canvas {}x{}, {} particles, {} workers, seed {}",
            self.config.width,
            self.config.height,
            self.config.particle_count,
            self.config.worker_count,
            controller.seed()
        );

        let event_loop = EventLoop::<Repaint>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Wait);
        let proxy = event_loop.create_proxy();

        let mut app = App::new(self.config, controller, proxy);
        event_loop.run_app(&mut app)?;
        app.finish()
    }
}

struct App {
    config: Config,
    controller: Controller,
    /// Handed to the workers once the window exists.
    proxy: Option<EventLoopProxy<Repaint>>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuSurface>,
    clock: FrameClock,
    failure: Option<SimulationError>,
}

impl App {
    fn new(config: Config, controller: Controller, proxy: EventLoopProxy<Repaint>) -> Self {
        Self {
            config,
            controller,
            proxy: Some(proxy),
            window: None,
            gpu: None,
            clock: FrameClock::new(),
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuSurface::new(
            Arc::clone(&window),
            (self.config.width, self.config.height),
            self.controller.store().len(),
        ))?;
        self.window = Some(window);
        self.gpu = Some(gpu);

        if let Some(proxy) = self.proxy.take() {
            self.controller.start(proxy)?;
        }
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SimulationError) {
        log::error!("{}", error);
        self.controller.shutdown();
        self.failure = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        match gpu.paint(self.controller.store(), &self.config.style) {
            Ok(()) => {
                if self.clock.tick() {
                    if let Some(window) = &self.window {
                        window.set_title(&format!("{} - {:.0} fps", self.config.title, self.clock.fps()));
                    }
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, closing");
                self.controller.shutdown();
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }

    fn finish(mut self) -> Result<(), SimulationError> {
        self.controller.shutdown();
        match self.failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler<Repaint> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, _event: Repaint) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                let report = self.controller.shutdown();
                if report.workers > 0 {
                    log::info!(
                        "window closed after {} paints in {:.1}s",
                        self.clock.frame(),
                        self.clock.elapsed().as_secs_f32()
                    );
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.controller.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let sim = Simulation::new()
            .with_canvas_size(320, 200)
            .with_particle_count(50)
            .with_worker_count(3)
            .with_jitter(1)
            .with_frame_interval(Duration::from_millis(8))
            .with_mark_size(3)
            .with_colors(Color::WHITE, Color::BLACK)
            .with_seed(7)
            .with_title("test");

        let config = sim.config();
        assert_eq!((config.width, config.height), (320, 200));
        assert_eq!(config.particle_count, 50);
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.jitter, 1);
        assert_eq!(config.frame_interval, Duration::from_millis(8));
        assert_eq!(config.style.size, 3);
        assert_eq!(config.style.background, Color::WHITE);
        assert_eq!(config.style.color, Color::BLACK);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.title, "test");
    }

    #[test]
    fn test_invalid_config_fails_before_opening_window() {
        let result = Simulation::new().with_worker_count(0).run();
        assert!(matches!(result, Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_default_is_classic_setup() {
        assert_eq!(Simulation::new().config(), &Config::default());
    }
}
