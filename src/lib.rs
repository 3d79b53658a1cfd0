//! # Index Sheets
//!
//! Per-month contact sheets for a date-structured photo archive. Point it at
//! an archive laid out as `YYYY/YYYY-MM/YYYY-MM-DD/` and it writes one grid
//! of captioned thumbnails per month (split into pages when a month is large).
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      archive/   →  month groups      (filesystem → ordered file lists)
//! 2. Paginate  group      →  pages             (≤ max_thumbnails each)
//! 3. Render    page       →  index_YYYY-MM.jpg (thumbnails + captions → one canvas)
//! ```
//!
//! Every stage below the driver is either a pure function or a call into the
//! [`imaging::ImageBackend`] trait, so pipeline logic is tested with a
//! recording mock and never needs real pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`classify`] | Pure predicates for `YYYY` / `YYYY-MM` / `YYYY-MM-DD` names and image extensions |
//! | [`scan`] | Walks the archive and groups image files by month |
//! | [`index`] | Pipeline driver: pages, output paths, per-item failure isolation, run report |
//! | [`imaging`] | Backend trait, grid geometry, page composition, the `image`-crate backend |
//! | [`naming`] | Output file names and caption truncation |
//! | [`config`] | Layered `index-sheets.toml` loading and validation |
//! | [`types`] | Shared value types (`MonthKey`, `ThumbnailSpec`, `OutputFormat`) |
//! | [`output`] | Console formatting for the dry-run plan and the end-of-run summary |
//!
//! # Failure Tiers
//!
//! - **Fatal** (missing root, invalid config, unusable output directory or
//!   format) — returned as [`index::IndexError`]; nothing is rendered.
//! - **Per file** (corrupt or undecodable image) — logged, the file is left
//!   off its page, the run continues.
//! - **Per page** (composite cannot be written) — logged, the page is
//!   recorded as failed, remaining pages and months continue.
//!
//! A page whose thumbnails all failed is omitted rather than written as an
//! empty canvas.

pub mod classify;
pub mod config;
pub mod imaging;
pub mod index;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
