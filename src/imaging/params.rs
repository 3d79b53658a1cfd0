//! Parameter types for backend operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between [`operations`](super::operations) (which decides layout and order)
//! and the [`backend`](super::backend) (which does the pixel work), so a mock
//! backend can stand in for the real one in tests.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ThumbnailParams`] — Source image, box size, letterbox and frame colors.
//! - [`CaptionParams`] — Text strip: text, strip size, font size, colors.
//! - [`ComposeParams`] — Canvas size, background, output path, and the tiles to place.

use crate::types::Color;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Render one source image into a fixed `width`×`height` box.
///
/// The image is scaled to fit inside the box with its aspect ratio intact,
/// centered, and the uncovered area filled with `background`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// 1px border drawn on the box edge.
    pub frame: Option<Color>,
}

/// Render a single line of text centered in a `width`×`height` strip.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionParams {
    pub text: String,
    pub width: u32,
    pub height: u32,
    pub font_size: f32,
    pub color: Color,
    pub background: Color,
}

/// A tile positioned on the canvas by its top-left corner.
#[derive(Debug)]
pub struct Placement<'a, T> {
    pub tile: &'a T,
    pub x: u32,
    pub y: u32,
}

/// Composite tiles onto one canvas and write it to `output`.
///
/// The encoded format follows the extension of `output`.
#[derive(Debug)]
pub struct ComposeParams<'a, T> {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub quality: Quality,
    pub placements: Vec<Placement<'a, T>>,
}
