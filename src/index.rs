//! Pipeline driver.
//!
//! Ties the stages together for a whole archive:
//!
//! ```text
//! scan(root) ──► MonthGroup ──► paginate ──► Page ──► render_page ──► index_YYYY-MM[_NNN].ext
//!                   (per month)                (per page)
//! ```
//!
//! Fatal problems (archive root missing, output format not encodable, output
//! directory not creatable) stop the run before anything is written and come
//! back as [`IndexError`]. Everything after that is isolated: a bad file only
//! loses its thumbnail and a failed write only loses its page, and both are
//! recorded in the [`RunReport`].
//!
//! ## Output Placement
//!
//! ```text
//! archive/2024/index_2024-01.jpg          # default: next to the month dirs
//! <output_dir>/index_2024-01.jpg          # with an output directory (flat)
//! ```
//!
//! Index files sit outside day directories, so rerunning never picks up a
//! previous run's output as a source image.

use crate::config::ConfigError;
use crate::imaging::{
    BackendError, ImageBackend, PageOutcome, PageReport, RustBackend, page_count, paginate,
    render_page,
};
use crate::naming::index_path;
use crate::scan::{MonthGroup, ScanError, scan};
use crate::types::{MonthKey, ThumbnailSpec};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened to one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthReport {
    pub key: MonthKey,
    /// Image files found for the month.
    pub image_count: usize,
    pub pages: Vec<PageReport>,
}

/// What happened to the whole archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub months: Vec<MonthReport>,
}

impl RunReport {
    fn pages(&self) -> impl Iterator<Item = &PageReport> {
        self.months.iter().flat_map(|m| &m.pages)
    }

    fn count_pages(&self, pred: impl Fn(&PageOutcome) -> bool) -> usize {
        self.pages().filter(|p| pred(&p.outcome)).count()
    }

    pub fn images_found(&self) -> usize {
        self.months.iter().map(|m| m.image_count).sum()
    }

    pub fn pages_written(&self) -> usize {
        self.count_pages(|o| matches!(o, PageOutcome::Written { .. }))
    }

    /// Pages whose every thumbnail failed, so no file was written.
    pub fn pages_empty(&self) -> usize {
        self.count_pages(|o| matches!(o, PageOutcome::Empty))
    }

    pub fn pages_failed(&self) -> usize {
        self.count_pages(|o| matches!(o, PageOutcome::Failed { .. }))
    }

    pub fn thumbnails(&self) -> usize {
        self.pages().map(PageReport::thumbnails).sum()
    }

    pub fn files_skipped(&self) -> usize {
        self.pages().map(|p| p.failures.len()).sum()
    }

    /// True when at least one index image could not be written.
    pub fn has_errors(&self) -> bool {
        self.pages_failed() > 0
    }
}

/// One output image a run would write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedPage {
    pub number: usize,
    pub total: usize,
    pub output: PathBuf,
    pub files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMonth {
    pub key: MonthKey,
    pub image_count: usize,
    pub pages: Vec<PlannedPage>,
}

/// Build index images for the archive at `root` with the `image`-crate backend.
///
/// `font` selects the caption font; `None` searches common system locations.
pub fn build_indexes(
    root: &Path,
    spec: &ThumbnailSpec,
    font: Option<&Path>,
) -> Result<RunReport, IndexError> {
    let backend = RustBackend::new(font)?;
    build_indexes_with_backend(&backend, root, spec)
}

/// Build index images using a specific backend (allows testing with mock).
pub fn build_indexes_with_backend<B: ImageBackend>(
    backend: &B,
    root: &Path,
    spec: &ThumbnailSpec,
) -> Result<RunReport, IndexError> {
    backend.check_output(spec.format)?;
    let groups = scan(root)?;

    if let Some(dir) = &spec.output_dir {
        std::fs::create_dir_all(dir).map_err(|source| IndexError::OutputDir {
            path: dir.clone(),
            source,
        })?;
    }

    info!(
        "Found {} month(s) with {} image(s) in {}",
        groups.len(),
        groups.iter().map(|g| g.files.len()).sum::<usize>(),
        root.display()
    );

    let months = groups
        .iter()
        .map(|group| index_month(backend, root, group, spec))
        .collect();

    Ok(RunReport { months })
}

fn index_month<B: ImageBackend>(
    backend: &B,
    root: &Path,
    group: &MonthGroup,
    spec: &ThumbnailSpec,
) -> MonthReport {
    let pages = paginate(&group.files, spec.max_per_page);
    info!(
        "{}: {} image(s), {} page(s)",
        group.key,
        group.files.len(),
        pages.len()
    );

    let reports = pages
        .iter()
        .map(|page| {
            let output = index_path(
                root,
                spec.output_dir.as_deref(),
                group.key,
                page.number,
                page.total,
                spec.format,
            );
            debug!(
                "{} page {}/{}: {} file(s) → {}",
                group.key,
                page.number,
                page.total,
                page.files.len(),
                output.display()
            );
            render_page(backend, page, spec, &output)
        })
        .collect();

    MonthReport {
        key: group.key,
        image_count: group.files.len(),
        pages: reports,
    }
}

/// Scan `root` and list the index images a run would write, without rendering.
pub fn plan(root: &Path, spec: &ThumbnailSpec) -> Result<Vec<PlannedMonth>, IndexError> {
    let groups = scan(root)?;
    Ok(groups
        .iter()
        .map(|group| {
            let total = page_count(group.files.len(), spec.max_per_page);
            let pages = paginate(&group.files, spec.max_per_page)
                .iter()
                .map(|page| PlannedPage {
                    number: page.number,
                    total,
                    output: index_path(
                        root,
                        spec.output_dir.as_deref(),
                        group.key,
                        page.number,
                        total,
                        spec.format,
                    ),
                    files: page.files.len(),
                })
                .collect();
            PlannedMonth {
                key: group.key,
                image_count: group.files.len(),
                pages,
            }
        })
        .collect())
}
