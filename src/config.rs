//! Startup configuration.
//!
//! Every value is fixed once the simulation starts. The defaults reproduce the
//! classic setup: an 800x600 canvas, 1000 particles, 4 workers, offsets in
//! `-2..=2` and a ~60 Hz pacing interval.

use std::time::Duration;

use crate::error::ConfigError;
use crate::render::{Color, MarkStyle};

/// Canvas width in pixels.
pub const DEFAULT_WIDTH: u32 = 800;
/// Canvas height in pixels.
pub const DEFAULT_HEIGHT: u32 = 600;
/// Number of particles.
pub const DEFAULT_PARTICLE_COUNT: usize = 1000;
/// Number of worker threads.
pub const DEFAULT_WORKER_COUNT: usize = 4;
/// Largest per-axis offset applied in one step.
pub const DEFAULT_JITTER: i32 = 2;
/// Delay between two passes of the same worker (~60 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Side of the square drawn for each particle.
pub const DEFAULT_MARK_SIZE: u32 = 2;
/// Window title.
pub const DEFAULT_TITLE: &str = "Particle Simulation";

/// Configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Canvas width; particle `x` stays in `0..width`.
    pub width: u32,
    /// Canvas height; particle `y` stays in `0..height`.
    pub height: u32,
    /// Number of particles, fixed for the lifetime of the store.
    pub particle_count: usize,
    /// Number of worker threads, independent of the particle count.
    pub worker_count: usize,
    /// Offsets are drawn uniformly from `-jitter..=jitter`.
    pub jitter: i32,
    /// Sleep between two passes of one worker.
    pub frame_interval: Duration,
    /// How particles are drawn.
    pub style: MarkStyle,
    /// Base seed for the random sources. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Window title.
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            particle_count: DEFAULT_PARTICLE_COUNT,
            worker_count: DEFAULT_WORKER_COUNT,
            jitter: DEFAULT_JITTER,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            style: MarkStyle {
                background: Color::BLACK,
                color: Color::RED,
                size: DEFAULT_MARK_SIZE,
            },
            seed: None,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Config {
    /// Check the values a run cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        // Coordinates are stored as i32.
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(ConfigError::CanvasTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.jitter < 0 {
            return Err(ConfigError::NegativeJitter(self.jitter));
        }
        if self.frame_interval.is_zero() {
            return Err(ConfigError::ZeroFrameInterval);
        }
        Ok(())
    }

    /// The configured seed, or a fresh one from the thread RNG.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
