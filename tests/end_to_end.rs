//! Headless runs of the full worker pool against the classic setup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use jitterfield::{
    advance_partition, paint, partition, Config, Controller, LifecycleState, MarkBatch, Partition,
    RepaintRequester,
};

#[derive(Clone, Default)]
struct CountingRepaint(Arc<AtomicUsize>);

impl RepaintRequester for CountingRepaint {
    fn request_repaint(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn classic() -> Config {
    Config {
        seed: Some(2024),
        ..Config::default()
    }
}

fn wait_for_frames(controller: &Controller, min: u64) {
    while controller.frames().iter().any(|&f| f < min) {
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn classic_partitions() {
    let ranges: Vec<_> = partition(1000, 4).iter().map(Partition::range).collect();
    assert_eq!(ranges, vec![0..250, 250..500, 500..750, 750..1000]);
}

#[test]
fn one_pass_stays_in_bounds_and_moves_at_most_two() {
    let controller = Controller::from_config(&classic()).unwrap();
    let store = controller.store();
    let before = store.snapshot();

    for (i, part) in partition(store.len(), 4).into_iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(i as u64);
        advance_partition(store, part, 2, &mut rng);
    }

    let after = store.snapshot();
    assert_eq!(after.len(), 1000);
    for (old, new) in before.iter().zip(&after) {
        assert!((0..800).contains(&new.x) && (0..600).contains(&new.y));
        assert!((old.x - new.x).abs() <= 2);
        assert!((old.y - new.y).abs() <= 2);
    }
}

#[test]
fn concurrent_run_keeps_invariant_and_stops_cleanly() {
    let mut config = classic();
    config.frame_interval = Duration::from_millis(1);
    let mut controller = Controller::from_config(&config).unwrap();
    let repaint = CountingRepaint::default();
    controller.start(repaint.clone()).unwrap();
    assert_eq!(controller.state(), LifecycleState::Running);

    // Paint while the workers are writing; every observed position must be valid.
    let store = Arc::clone(controller.store());
    let mut batch = MarkBatch::with_capacity(store.len());
    for _ in 0..20 {
        paint(&store, &mut batch, &config.style);
        assert_eq!(batch.marks.len(), 1000);
        for mark in &batch.marks {
            assert!((0.0..800.0).contains(&mark.position[0]));
            assert!((0.0..600.0).contains(&mark.position[1]));
        }
        thread::sleep(Duration::from_millis(1));
    }
    wait_for_frames(&controller, 5);

    let report = controller.shutdown();
    assert_eq!(report.workers, 4);
    assert!(report.panicked.is_empty());
    assert_eq!(repaint.0.load(Ordering::Relaxed) as u64, report.frames);

    let frozen = store.snapshot();
    thread::sleep(Duration::from_millis(40));
    assert_eq!(store.snapshot(), frozen);
    assert!(frozen.iter().all(|&p| store.in_bounds(p)));

    // A second close signal must be harmless.
    assert_eq!(controller.shutdown().workers, 0);
    assert_eq!(controller.state(), LifecycleState::Stopped);
}

#[test]
fn uneven_split_runs_every_worker() {
    let config = Config {
        particle_count: 1003,
        worker_count: 4,
        frame_interval: Duration::from_millis(1),
        seed: Some(5),
        ..Config::default()
    };
    let mut controller = Controller::from_config(&config).unwrap();
    controller.start(()).unwrap();

    let parts = controller.partitions().to_vec();
    assert_eq!(parts.last().map(Partition::len), Some(253));
    wait_for_frames(&controller, 3);

    assert_eq!(controller.shutdown().workers, 4);
}
