//! Bridge between the particle store and a display surface.
//!
//! The bridge knows nothing about partitions or workers. On every paint it
//! reads the whole store, which may be mid-update (see [`crate::store`]), and
//! emits one `clear` followed by one `draw_mark` per particle.

use bytemuck::{Pod, Zeroable};

use crate::store::ParticleStore;

/// Linear RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

/// How the bridge draws the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStyle {
    /// Fill for the whole surface before drawing.
    pub background: Color,
    /// Fill for every particle mark.
    pub color: Color,
    /// Side of the square mark in canvas pixels.
    pub size: u32,
}

/// Drawing half of the display surface, driven on the paint thread.
pub trait DisplaySurface {
    /// Fill the whole surface with `color`.
    fn clear(&mut self, color: Color);
    /// Draw a `size` x `size` square whose top-left corner is `(x, y)`.
    fn draw_mark(&mut self, x: i32, y: i32, size: u32, color: Color);
}

/// Repaint half of the display surface, called from worker threads.
///
/// Requests are fire-and-forget: the surface may coalesce several into one
/// paint or drop them once it has shut down.
pub trait RepaintRequester {
    fn request_repaint(&self);
}

/// Headless runs have nothing to repaint.
impl RepaintRequester for () {
    fn request_repaint(&self) {}
}

/// Clear `surface` to the background and draw every particle in `store`.
pub fn paint<S: DisplaySurface + ?Sized>(store: &ParticleStore, surface: &mut S, style: &MarkStyle) {
    surface.clear(style.background);
    store.for_each(|_, p| surface.draw_mark(p.x, p.y, style.size, style.color));
}

/// One mark as uploaded to the GPU instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MarkInstance {
    /// Top-left corner in canvas pixels.
    pub position: [f32; 2],
    /// Side in canvas pixels.
    pub size: f32,
    pub _pad: f32,
    pub color: [f32; 4],
}

/// CPU-side surface that records one frame's draw commands.
///
/// The GPU surface uploads `marks` as an instance buffer and uses `clear` as
/// the render pass load color.
#[derive(Debug, Clone)]
pub struct MarkBatch {
    pub clear: Color,
    pub marks: Vec<MarkInstance>,
}

impl MarkBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clear: Color::BLACK,
            marks: Vec::with_capacity(capacity),
        }
    }
}

impl DisplaySurface for MarkBatch {
    fn clear(&mut self, color: Color) {
        self.clear = color;
        self.marks.clear();
    }

    fn draw_mark(&mut self, x: i32, y: i32, size: u32, color: Color) {
        self.marks.push(MarkInstance {
            position: [x as f32, y as f32],
            size: size as f32,
            _pad: 0.0,
            color: color.to_array(),
        });
    }
}
