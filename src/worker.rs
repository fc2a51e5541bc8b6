//! Per-thread update loop.
//!
//! A worker repeats: check the run flag, jitter every particle of its
//! partition, request a repaint, then wait one frame interval on its
//! cancellation channel. The wait is the only place a worker blocks, and a
//! message or a hung-up sender ends the loop at once.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::partition::Partition;
use crate::render::RepaintRequester;
use crate::store::ParticleStore;

/// Everything a worker thread owns.
pub struct Worker<R> {
    pub index: usize,
    pub partition: Partition,
    pub store: Arc<ParticleStore>,
    pub running: Arc<AtomicBool>,
    pub cancel: Receiver<()>,
    pub frames: Arc<AtomicU64>,
    pub jitter: i32,
    pub frame_interval: Duration,
    pub seed: u64,
    pub repaint: R,
}

/// Seed for worker `index`, distinct per worker for a given run seed.
#[inline]
pub fn worker_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add(index as u64 + 1)
}

/// Apply one random step to every particle of `partition`.
///
/// Offsets for `x` and `y` are drawn independently from `-jitter..=jitter`.
pub fn advance_partition<R: Rng>(
    store: &ParticleStore,
    partition: Partition,
    jitter: i32,
    rng: &mut R,
) {
    for index in partition.range() {
        let dx = rng.gen_range(-jitter..=jitter);
        let dy = rng.gen_range(-jitter..=jitter);
        store.nudge(index, dx, dy);
    }
}

impl<R: RepaintRequester> Worker<R> {
    /// Run until the run flag drops or the pacing wait is cancelled.
    ///
    /// Returns the number of completed frames.
    pub fn run(self) -> u64 {
        let mut rng = StdRng::seed_from_u64(worker_seed(self.seed, self.index));
        let mut frames = 0u64;

        loop {
            if !self.running.load(Ordering::Acquire) {
                break;
            }

            advance_partition(&self.store, self.partition, self.jitter, &mut rng);
            frames += 1;
            self.frames.store(frames, Ordering::Relaxed);
            self.repaint.request_repaint();

            match self.cancel.recv_timeout(self.frame_interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        log::debug!(
            "worker {} stopped after {} frames (particles {}..{})",
            self.index,
            frames,
            self.partition.start,
            self.partition.end
        );
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;
    use crate::store::Particle;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;

    #[derive(Clone, Default)]
    struct CountingRepaint(Arc<AtomicUsize>);

    impl RepaintRequester for CountingRepaint {
        fn request_repaint(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn grid_store(n: i32) -> ParticleStore {
        ParticleStore::from_positions(800, 600, (0..n).map(|i| Particle::new(100 + i % 600, 100 + i % 400)))
    }

    fn worker(
        store: Arc<ParticleStore>,
        running: bool,
        cancel: Receiver<()>,
        repaint: CountingRepaint,
    ) -> Worker<CountingRepaint> {
        let len = store.len();
        Worker {
            index: 0,
            partition: Partition { start: 0, end: len },
            store,
            running: Arc::new(AtomicBool::new(running)),
            cancel,
            frames: Arc::new(AtomicU64::new(0)),
            jitter: 2,
            frame_interval: Duration::from_millis(1),
            seed: 9,
            repaint,
        }
    }

    #[test]
    fn test_step_moves_at_most_jitter() {
        let store = grid_store(1000);
        let before = store.snapshot();
        let mut rng = StdRng::seed_from_u64(1);
        advance_partition(&store, Partition { start: 0, end: 1000 }, 2, &mut rng);

        for (old, new) in before.iter().zip(store.snapshot()) {
            assert!((old.x - new.x).abs() <= 2);
            assert!((old.y - new.y).abs() <= 2);
        }
    }

    #[test]
    fn test_clamp_invariant_after_many_steps() {
        let store = ParticleStore::from_positions(
            8,
            6,
            [Particle::new(0, 0), Particle::new(7, 5), Particle::new(3, 3)],
        );
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10_000 {
            advance_partition(&store, Partition { start: 0, end: 3 }, 2, &mut rng);
            assert!(store.snapshot().iter().all(|&p| store.in_bounds(p)));
        }
    }

    #[test]
    fn test_zero_jitter_keeps_positions() {
        let store = grid_store(50);
        let before = store.snapshot();
        advance_partition(&store, Partition { start: 0, end: 50 }, 0, &mut StdRng::seed_from_u64(2));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_advance_leaves_other_partitions_untouched() {
        let store = grid_store(1000);
        let parts = partition(1000, 4);
        let mut rng = StdRng::seed_from_u64(11);

        for (owner, part) in parts.iter().enumerate() {
            let before = store.snapshot();
            for _ in 0..50 {
                advance_partition(&store, *part, 2, &mut rng);
            }
            let after = store.snapshot();
            for (i, (old, new)) in before.iter().zip(&after).enumerate() {
                if !part.contains(i) {
                    assert_eq!(old, new, "worker {} touched index {}", owner, i);
                }
            }
        }
    }

    #[test]
    fn test_empty_partition_is_a_no_op() {
        let store = grid_store(10);
        let before = store.snapshot();
        advance_partition(&store, Partition { start: 4, end: 4 }, 2, &mut StdRng::seed_from_u64(0));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_stopped_flag_exits_before_first_frame() {
        let store = Arc::new(grid_store(10));
        let before = store.snapshot();
        let (_tx, rx) = mpsc::channel();
        let repaint = CountingRepaint::default();

        let frames = worker(store.clone(), false, rx, repaint.clone()).run();

        assert_eq!(frames, 0);
        assert_eq!(repaint.0.load(Ordering::Relaxed), 0);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_hang_up_cancels_pacing_wait() {
        let store = Arc::new(grid_store(10));
        let (tx, rx) = mpsc::channel();
        let repaint = CountingRepaint::default();
        let mut w = worker(store, true, rx, repaint.clone());
        w.frame_interval = Duration::from_secs(3600);

        let handle = thread::spawn(move || w.run());
        while repaint.0.load(Ordering::Relaxed) == 0 {
            thread::yield_now();
        }
        drop(tx);

        // Would block for an hour if the wait were not interrupted.
        let frames = handle.join().unwrap();
        assert_eq!(frames, 1);
    }

    #[test]
    fn test_repaint_once_per_frame() {
        let store = Arc::new(grid_store(10));
        let (tx, rx) = mpsc::channel();
        let repaint = CountingRepaint::default();
        let w = worker(store, true, rx, repaint.clone());
        let frames_counter = w.frames.clone();

        let handle = thread::spawn(move || w.run());
        while frames_counter.load(Ordering::Relaxed) < 5 {
            thread::yield_now();
        }
        tx.send(()).unwrap();
        let frames = handle.join().unwrap();

        assert!(frames >= 5);
        assert_eq!(repaint.0.load(Ordering::Relaxed) as u64, frames);
        assert_eq!(frames_counter.load(Ordering::Relaxed), frames);
    }

    #[test]
    fn test_worker_seeds_are_distinct() {
        let seeds: Vec<_> = (0..8).map(|i| worker_seed(42, i)).collect();
        for (i, a) in seeds.iter().enumerate() {
            assert!(seeds[i + 1..].iter().all(|b| a != b));
        }
    }
}
