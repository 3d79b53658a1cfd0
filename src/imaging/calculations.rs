//! Pure layout calculations: pagination, grid geometry, aspect-ratio fitting.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Cell Geometry
//!
//! ```text
//!  margin/2
//!  ┌──────────────────── cell_width = width + margin ───────────────────┐
//!  │  ┌──────────────────────────────┐                                  │
//!  │  │ thumbnail  (width × height)  │                                  │
//!  │  └──────────────────────────────┘                                  │
//!  │  caption strip (width × caption_height)                           │
//!  └─────────────── cell_height = height + caption_height + margin ─────┘
//! ```
//!
//! The canvas is always `per_row` cells wide. A multi-page month adds a
//! footer band of `footer_height` below the last row.
//!
//! A canvas is capped at [`MAX_CANVAS_SIDE`] pixels per side and
//! [`MAX_CANVAS_PIXELS`] in total; [`GridLayout::new`] returns `None` past
//! either limit.

use crate::types::ThumbnailSpec;
use std::path::PathBuf;

/// Largest width or height of an index image (the JPEG limit).
pub const MAX_CANVAS_SIDE: u32 = 65_535;

/// Largest pixel count of an index image, about 768 MiB of RGB.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// A contiguous slice of a month's files destined for one output image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,
    pub total: usize,
    pub files: &'a [PathBuf],
}

/// Number of pages needed for `total` files at `per_page` files each.
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1))
}

/// Split `files` into pages of at most `per_page`, preserving order.
///
/// Concatenating the pages reproduces `files` exactly. An empty list yields
/// no pages.
pub fn paginate(files: &[PathBuf], per_page: usize) -> Vec<Page<'_>> {
    let per_page = per_page.max(1);
    let total = page_count(files.len(), per_page);
    files
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            total,
            files: chunk,
        })
        .collect()
}

/// Scale `source` to fit inside `bounds` preserving aspect ratio.
///
/// One dimension matches the bound exactly, the other is ≤ its bound. Small
/// sources are enlarged. Never returns a zero dimension.
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as u64, source.1.max(1) as u64);
    let (max_w, max_h) = (bounds.0.max(1) as u64, bounds.1.max(1) as u64);

    if src_w * max_h >= src_h * max_w {
        // Source is relatively wider: width hits the bound
        let h = (src_h * max_w) as f64 / src_w as f64;
        (max_w as u32, (h.round() as u64).clamp(1, max_h) as u32)
    } else {
        let w = (src_w * max_h) as f64 / src_h as f64;
        ((w.round() as u64).clamp(1, max_w) as u32, max_h as u32)
    }
}

/// Top-left offset that centers `inner` inside `outer`.
pub fn centered_offset(inner: (u32, u32), outer: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}

/// Geometry of one index image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: u32,
    pub per_row: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Height of the footer band (0 when there is none).
    pub footer_height: u32,
    thumb_width: u32,
    thumb_height: u32,
    margin: u32,
}

impl GridLayout {
    /// Layout for `count` thumbnails.
    ///
    /// `rows = ceil(count / per_row)`, `canvas_width = per_row × (width + margin)`,
    /// `canvas_height = rows × (height + caption_height + margin)` plus the
    /// footer when `with_footer`.
    ///
    /// Returns `None` when the canvas would exceed [`MAX_CANVAS_SIDE`] or
    /// [`MAX_CANVAS_PIXELS`].
    pub fn new(count: usize, spec: &ThumbnailSpec, with_footer: bool) -> Option<Self> {
        let per_row = spec.per_row.max(1);
        let rows = u32::try_from(count).ok()?.div_ceil(per_row);
        let cell_width = spec.width.checked_add(spec.margin)?;
        let cell_height = spec
            .height
            .checked_add(spec.caption_height)?
            .checked_add(spec.margin)?;
        let footer_height = if with_footer { spec.footer_height } else { 0 };

        let canvas_width = per_row.checked_mul(cell_width)?;
        let canvas_height = rows.checked_mul(cell_height)?.checked_add(footer_height)?;
        if canvas_width > MAX_CANVAS_SIDE
            || canvas_height > MAX_CANVAS_SIDE
            || canvas_width as u64 * canvas_height as u64 > MAX_CANVAS_PIXELS
        {
            return None;
        }

        Some(Self {
            rows,
            per_row,
            cell_width,
            cell_height,
            canvas_width,
            canvas_height,
            footer_height,
            thumb_width: spec.width,
            thumb_height: spec.height,
            margin: spec.margin,
        })
    }

    /// `(row, col)` of the `index`-th thumbnail, row-major.
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index / self.per_row, index % self.per_row)
    }

    /// Top-left corner of the `index`-th thumbnail box.
    pub fn thumbnail_origin(&self, index: usize) -> (u32, u32) {
        let (row, col) = self.cell(index);
        (
            col * self.cell_width + self.margin / 2,
            row * self.cell_height + self.margin / 2,
        )
    }

    /// Top-left corner of the caption strip under the `index`-th thumbnail.
    pub fn caption_origin(&self, index: usize) -> (u32, u32) {
        let (x, y) = self.thumbnail_origin(index);
        (x, y + self.thumb_height)
    }

    /// Top-left corner of the footer band.
    pub fn footer_origin(&self) -> (u32, u32) {
        (0, self.rows * self.cell_height)
    }
}
