//! Shared particle positions.
//!
//! The store is a fixed-length arena shared by every worker and by the
//! renderer. Writes are partitioned: each index belongs to exactly one worker
//! for the lifetime of the run (see [`crate::partition`]), so no index is
//! ever written by two threads.
//!
//! # Relaxed consistency
//!
//! Each coordinate lives in its own `AtomicI32` and is read and written with
//! `Ordering::Relaxed`. A single coordinate can never tear, and because every
//! write stores an already clamped value, every value a reader can observe is
//! in bounds. Nothing else is guaranteed to a concurrent reader: it may see
//! `x` from one frame and `y` from the next, and different partitions at
//! different frame numbers. The renderer accepts that mixture as a visual
//! approximation.

use std::sync::atomic::{AtomicI32, Ordering};

use rand::Rng;

/// A particle position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Particle {
    pub x: i32,
    pub y: i32,
}

impl Particle {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug)]
struct Cell {
    x: AtomicI32,
    y: AtomicI32,
}

/// Fixed-size particle arena shared between workers and the renderer.
#[derive(Debug)]
pub struct ParticleStore {
    cells: Box<[Cell]>,
    width: i32,
    height: i32,
}

/// Saturating clamp of `value` into `0..extent`.
#[inline]
pub fn clamp_coord(value: i32, extent: i32) -> i32 {
    value.clamp(0, extent - 1)
}

impl ParticleStore {
    /// Fill `n` particles uniformly at random over `[0, width) x [0, height)`.
    ///
    /// `width` and `height` must be positive; [`crate::Config::validate`]
    /// checks that before a store is built.
    pub fn initialize<R: Rng>(n: usize, width: u32, height: u32, rng: &mut R) -> Self {
        let (w, h) = (width as i32, height as i32);
        let cells = (0..n)
            .map(|_| Cell {
                x: AtomicI32::new(rng.gen_range(0..w)),
                y: AtomicI32::new(rng.gen_range(0..h)),
            })
            .collect();
        Self {
            cells,
            width: w,
            height: h,
        }
    }

    /// Build a store from explicit positions, clamping each into bounds.
    pub fn from_positions<I>(width: u32, height: u32, positions: I) -> Self
    where
        I: IntoIterator<Item = Particle>,
    {
        let (w, h) = (width as i32, height as i32);
        let cells = positions
            .into_iter()
            .map(|p| Cell {
                x: AtomicI32::new(clamp_coord(p.x, w)),
                y: AtomicI32::new(clamp_coord(p.y, h)),
            })
            .collect();
        Self {
            cells,
            width: w,
            height: h,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Current position of particle `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> Particle {
        let cell = &self.cells[index];
        Particle {
            x: cell.x.load(Ordering::Relaxed),
            y: cell.y.load(Ordering::Relaxed),
        }
    }

    /// Offset particle `index` by `(dx, dy)` and clamp it back onto the canvas.
    ///
    /// Only the worker owning `index` may call this while workers run.
    #[inline]
    pub fn nudge(&self, index: usize, dx: i32, dy: i32) {
        let cell = &self.cells[index];
        let x = cell.x.load(Ordering::Relaxed).saturating_add(dx);
        let y = cell.y.load(Ordering::Relaxed).saturating_add(dy);
        cell.x.store(clamp_coord(x, self.width), Ordering::Relaxed);
        cell.y.store(clamp_coord(y, self.height), Ordering::Relaxed);
    }

    /// Visit every particle in index order.
    pub fn for_each<F: FnMut(usize, Particle)>(&self, mut f: F) {
        for index in 0..self.cells.len() {
            f(index, self.get(index));
        }
    }

    /// Copy of all positions. May mix frames while workers are running.
    pub fn snapshot(&self) -> Vec<Particle> {
        (0..self.cells.len()).map(|i| self.get(i)).collect()
    }

    /// Whether `p` satisfies the clamp invariant for this canvas.
    #[inline]
    pub fn in_bounds(&self, p: Particle) -> bool {
        (0..self.width).contains(&p.x) && (0..self.height).contains(&p.y)
    }
}
