//! Worker pool lifecycle.
//!
//! The [`Controller`] owns the run flag, the partition table and one handle
//! per worker thread. It is single-shot:
//!
//! ```text
//! Idle --start--> Running --shutdown--> Stopping --(all joined)--> Stopped
//!   \______________________shutdown___________________________/
//! ```
//!
//! Shutdown lowers the run flag, hangs up every worker's cancellation channel
//! so pacing waits return immediately, and then blocks until every thread has
//! been joined. There is no timeout: workers observe cancellation within one
//! mutation pass.
//!
//! # Example
//!
//! ```no_run
//! use jitterfield::{Config, Controller};
//!
//! let mut controller = Controller::from_config(&Config::default()).unwrap();
//! controller.start(()).unwrap();
//! std::thread::sleep(std::time::Duration::from_millis(100));
//! let report = controller.shutdown();
//! assert_eq!(report.workers, 4);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::error::{ConfigError, LifecycleError};
use crate::partition::{partition, Partition};
use crate::render::RepaintRequester;
use crate::store::ParticleStore;
use crate::worker::Worker;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, no threads yet.
    Idle,
    /// Workers are looping.
    Running,
    /// Run flag lowered, joining workers.
    Stopping,
    /// Every worker has terminated. Final.
    Stopped,
}

/// What a shutdown call joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Worker threads joined by this call.
    pub workers: usize,
    /// Frames completed by the workers that exited normally.
    pub frames: u64,
    /// Indices of workers that panicked.
    pub panicked: Vec<usize>,
}

struct WorkerHandle {
    index: usize,
    thread: JoinHandle<u64>,
    cancel: Option<Sender<()>>,
}

/// Starts the worker pool and shuts it down exactly once.
pub struct Controller {
    store: Arc<ParticleStore>,
    running: Arc<AtomicBool>,
    state: LifecycleState,
    partitions: Vec<Partition>,
    workers: Vec<WorkerHandle>,
    frame_counters: Vec<Arc<AtomicU64>>,
    worker_count: usize,
    jitter: i32,
    frame_interval: Duration,
    seed: u64,
}

impl Controller {
    /// Create an idle controller over an existing store.
    pub fn new(store: Arc<ParticleStore>, config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            running: Arc::new(AtomicBool::new(false)),
            state: LifecycleState::Idle,
            partitions: Vec::new(),
            workers: Vec::new(),
            frame_counters: Vec::new(),
            worker_count: config.worker_count,
            jitter: config.jitter,
            frame_interval: config.frame_interval,
            seed: config.resolve_seed(),
        })
    }

    /// Create an idle controller with a freshly randomized store.
    ///
    /// The store and the workers draw from the same run seed, so a fixed
    /// `config.seed` reproduces the initial layout.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.resolve_seed();
        let mut rng = StdRng::seed_from_u64(seed);
        let store = ParticleStore::initialize(config.particle_count, config.width, config.height, &mut rng);
        Self::new(
            Arc::new(store),
            &Config {
                seed: Some(seed),
                ..config.clone()
            },
        )
    }

    /// Compute the partition table and spawn one worker per partition.
    ///
    /// Each worker gets its own clone of `repaint`.
    pub fn start<R>(&mut self, repaint: R) -> Result<(), LifecycleError>
    where
        R: RepaintRequester + Clone + Send + 'static,
    {
        if self.state != LifecycleState::Idle {
            return Err(LifecycleError::AlreadyStarted);
        }

        self.running.store(true, Ordering::Release);
        self.state = LifecycleState::Running;
        self.partitions = partition(self.store.len(), self.worker_count);

        for (index, part) in self.partitions.clone().into_iter().enumerate() {
            let (cancel_tx, cancel_rx) = mpsc::channel();
            let frames = Arc::new(AtomicU64::new(0));
            let worker = Worker {
                index,
                partition: part,
                store: Arc::clone(&self.store),
                running: Arc::clone(&self.running),
                cancel: cancel_rx,
                frames: Arc::clone(&frames),
                jitter: self.jitter,
                frame_interval: self.frame_interval,
                seed: self.seed,
                repaint: repaint.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("jitterfield-worker-{}", index))
                .spawn(move || worker.run());

            match spawned {
                Ok(thread) => {
                    self.workers.push(WorkerHandle {
                        index,
                        thread,
                        cancel: Some(cancel_tx),
                    });
                    self.frame_counters.push(frames);
                }
                Err(e) => {
                    log::error!("failed to spawn worker {}: {}", index, e);
                    self.shutdown();
                    return Err(LifecycleError::Spawn(e));
                }
            }
        }

        log::info!(
            "started {} workers over {} particles (jitter {}, interval {:?})",
            self.workers.len(),
            self.store.len(),
            self.jitter,
            self.frame_interval
        );
        Ok(())
    }

    /// Stop every worker and wait for all of them to terminate.
    ///
    /// Only the first call does anything; later calls return an empty report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        match self.state {
            LifecycleState::Running => {}
            LifecycleState::Idle => {
                self.state = LifecycleState::Stopped;
                return ShutdownReport::default();
            }
            LifecycleState::Stopping | LifecycleState::Stopped => return ShutdownReport::default(),
        }

        self.state = LifecycleState::Stopping;
        self.running.store(false, Ordering::Release);
        // Hanging up wakes every pacing wait.
        for worker in &mut self.workers {
            worker.cancel.take();
        }

        let mut report = ShutdownReport::default();
        for worker in self.workers.drain(..) {
            report.workers += 1;
            match worker.thread.join() {
                Ok(frames) => report.frames += frames,
                Err(_) => {
                    log::error!("worker {} panicked", worker.index);
                    report.panicked.push(worker.index);
                }
            }
        }

        self.state = LifecycleState::Stopped;
        log::info!(
            "stopped {} workers after {} frames in total",
            report.workers,
            report.frames
        );
        report
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Partition table, empty until `start`.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Frames completed so far by each worker, in partition order.
    pub fn frames(&self) -> Vec<u64> {
        self.frame_counters
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// The shared store, for painting.
    pub fn store(&self) -> &Arc<ParticleStore> {
        &self.store
    }

    /// Seed the workers derive their generators from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
