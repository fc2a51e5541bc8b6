//! Paint timing.
//!
//! Workers pace themselves with a fixed sleep; this clock only measures how
//! often the window actually paints, after the platform has coalesced the
//! workers' repaint requests.
//!
//! # Example
//!
//! ```
//! use jitterfield::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! clock.tick();
//! assert_eq!(clock.frame(), 1);
//! ```

use std::time::{Duration, Instant};

/// Counts paints and derives a periodically refreshed FPS value.
#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created.
    start: Instant,
    /// Total paints since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(500))
    }

    /// Clock that refreshes its FPS value every `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
        }
    }

    /// Record one paint. Returns `true` when the FPS value was refreshed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        self.frame_count += 1;

        let since = now.duration_since(self.fps_update_time);
        if since < self.fps_update_interval || since.is_zero() {
            return false;
        }
        let frames = self.frame_count - self.fps_frame_count;
        self.fps = frames as f32 / since.as_secs_f32();
        self.fps_frame_count = self.frame_count;
        self.fps_update_time = now;
        true
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
