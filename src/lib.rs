//! # jitterfield
//!
//! A fixed population of particles jittering randomly inside a canvas,
//! updated concurrently by a fixed pool of worker threads and drawn to a
//! window.
//!
//! ## Quick Start
//!
//! ```no_run
//! use jitterfield::Simulation;
//!
//! fn main() -> Result<(), jitterfield::SimulationError> {
//!     Simulation::new()
//!         .with_canvas_size(800, 600)
//!         .with_particle_count(1000)
//!         .with_worker_count(4)
//!         .run()
//! }
//! ```
//!
//! ## How it fits together
//!
//! | Piece | Module | Role |
//! |-------|--------|------|
//! | [`ParticleStore`] | [`store`] | shared fixed-size position arena |
//! | [`partition()`] | [`partition`] | one contiguous index range per worker |
//! | [`Worker`] | [`worker`] | jitter own range, request repaint, sleep |
//! | [`paint`] | [`render`] | clear surface, draw every particle |
//! | [`Controller`] | [`lifecycle`] | start workers, stop and join them once |
//!
//! Workers never share an index, so the store needs no locks. The renderer
//! reads while workers write and may see a mix of old and new positions;
//! see [`store`] for what is and is not guaranteed.
//!
//! ## Headless use
//!
//! The window is optional. A [`Controller`] runs the worker pool against any
//! [`RepaintRequester`] (`()` ignores repaints) and [`paint`] draws into any
//! [`DisplaySurface`]:
//!
//! ```no_run
//! use jitterfield::{Config, Controller, MarkBatch, paint};
//!
//! let config = Config::default();
//! let mut controller = Controller::from_config(&config).unwrap();
//! controller.start(()).unwrap();
//!
//! let mut batch = MarkBatch::with_capacity(config.particle_count);
//! paint(controller.store(), &mut batch, &config.style);
//! controller.shutdown();
//! ```

pub mod config;
pub mod error;
mod gpu;
pub mod lifecycle;
pub mod partition;
pub mod render;
mod simulation;
pub mod store;
pub mod time;
pub mod worker;

pub use config::Config;
pub use error::{ConfigError, GpuError, LifecycleError, SimulationError};
pub use gpu::{canvas_projection, GpuSurface, MARK_SHADER};
pub use lifecycle::{Controller, LifecycleState, ShutdownReport};
pub use partition::{partition, Partition};
pub use render::{paint, Color, DisplaySurface, MarkBatch, MarkInstance, MarkStyle, RepaintRequester};
pub use simulation::{Repaint, Simulation};
pub use store::{Particle, ParticleStore};
pub use worker::{advance_partition, Worker};
