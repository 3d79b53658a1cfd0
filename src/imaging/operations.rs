//! Page composition.
//!
//! [`render_page`] turns one [`Page`] into one index image:
//!
//! 1. Render a thumbnail for every file. Files that fail are logged and left
//!    off the page; the remaining thumbnails close ranks, so a failure never
//!    leaves a hole in the grid.
//! 2. If nothing rendered, stop: the page is omitted, no file is written.
//! 3. Render a caption for every thumbnail (a failed caption leaves the
//!    thumbnail uncaptioned) and, for multi-page months, the footer.
//! 4. Lay the tiles out on a [`GridLayout`] sized for the rendered count and
//!    hand them to the backend to composite and write.
//!
//! Everything that went wrong is returned in the [`PageReport`]; nothing is
//! raised past this function.

use super::backend::ImageBackend;
use super::calculations::{GridLayout, MAX_CANVAS_PIXELS, MAX_CANVAS_SIDE, Page};
use super::params::{CaptionParams, ComposeParams, Placement, Quality, ThumbnailParams};
use crate::naming::{caption_text, page_label};
use crate::types::ThumbnailSpec;
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A source file that could not be placed on its page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    /// Index image written with this many thumbnails.
    Written { thumbnails: usize },
    /// Every thumbnail failed; no file was written.
    Empty,
    /// Compositing or writing the index image failed.
    Failed { reason: String },
}

/// Result of rendering one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub number: usize,
    pub total: usize,
    pub output: PathBuf,
    pub outcome: PageOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}

impl PageReport {
    pub fn thumbnails(&self) -> usize {
        match self.outcome {
            PageOutcome::Written { thumbnails } => thumbnails,
            _ => 0,
        }
    }
}

/// Thumbnail box parameters for one source under `spec`.
pub fn plan_thumbnail(source: &Path, spec: &ThumbnailSpec) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        width: spec.width,
        height: spec.height,
        background: spec.background,
        frame: Some(spec.frame_color),
    }
}

fn plan_caption(text: String, width: u32, height: u32, spec: &ThumbnailSpec) -> CaptionParams {
    CaptionParams {
        text,
        width,
        height,
        font_size: spec.font_size,
        color: spec.caption_color,
        background: spec.background,
    }
}

/// Render `page` and write it to `output`.
pub fn render_page<B: ImageBackend>(
    backend: &B,
    page: &Page<'_>,
    spec: &ThumbnailSpec,
    output: &Path,
) -> PageReport {
    let mut failures = Vec::new();
    let mut rendered: Vec<(&Path, B::Tile)> = Vec::with_capacity(page.files.len());

    for source in page.files {
        match backend.thumbnail(&plan_thumbnail(source, spec)) {
            Ok(tile) => rendered.push((source.as_path(), tile)),
            Err(e) => {
                warn!("Skipping {}: {e}", source.display());
                failures.push(FileFailure {
                    path: source.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let report = |outcome| PageReport {
        number: page.number,
        total: page.total,
        output: output.to_path_buf(),
        outcome,
        failures: failures.clone(),
    };

    if rendered.is_empty() {
        warn!(
            "No thumbnails rendered for {}, page omitted",
            output.display()
        );
        return report(PageOutcome::Empty);
    }

    let with_footer = page.total > 1;
    let Some(layout) = GridLayout::new(rendered.len(), spec, with_footer) else {
        error!(
            "Cannot lay out {}: canvas for {} thumbnails exceeds {MAX_CANVAS_SIDE}px per side or {MAX_CANVAS_PIXELS} pixels",
            output.display(),
            rendered.len()
        );
        return report(PageOutcome::Failed {
            reason: "index image would be too large".to_string(),
        });
    };

    let captions: Vec<Option<B::Tile>> = rendered
        .iter()
        .map(|(source, _)| {
            let params = plan_caption(caption_text(source), spec.width, spec.caption_height, spec);
            backend
                .caption(&params)
                .map_err(|e| warn!("No caption for {}: {e}", source.display()))
                .ok()
        })
        .collect();

    let footer = if with_footer && layout.footer_height > 0 {
        let params = plan_caption(
            page_label(page.number, page.total),
            layout.canvas_width,
            layout.footer_height,
            spec,
        );
        backend
            .caption(&params)
            .map_err(|e| warn!("No page footer for {}: {e}", output.display()))
            .ok()
    } else {
        None
    };

    let mut placements = Vec::with_capacity(rendered.len() * 2 + 1);
    for (index, ((_, thumb), caption)) in rendered.iter().zip(&captions).enumerate() {
        let (x, y) = layout.thumbnail_origin(index);
        placements.push(Placement { tile: thumb, x, y });
        if let Some(caption) = caption {
            let (x, y) = layout.caption_origin(index);
            placements.push(Placement { tile: caption, x, y });
        }
    }
    if let Some(footer) = &footer {
        let (x, y) = layout.footer_origin();
        placements.push(Placement { tile: footer, x, y });
    }

    let params = ComposeParams {
        output: output.to_path_buf(),
        width: layout.canvas_width,
        height: layout.canvas_height,
        background: spec.background,
        quality: Quality::new(spec.quality),
        placements,
    };

    match backend.compose(&params) {
        Ok(()) => {
            info!(
                "Wrote {} ({} thumbnails)",
                output.display(),
                rendered.len()
            );
            report(PageOutcome::Written {
                thumbnails: rendered.len(),
            })
        }
        Err(e) => {
            error!("Failed to write {}: {e}", output.display());
            report(PageOutcome::Failed {
                reason: e.to_string(),
            })
        }
    }
}
