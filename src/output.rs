//! CLI output formatting for the dry-run plan and the end-of-run summary.
//!
//! # Information-First Display
//!
//! The primary display for every entity is its semantic identity: a month
//! by its `YYYY-MM` key, a page by its 3-digit number. Paths are secondary
//! context and are shown relative to the archive root where possible.
//!
//! # Output Format
//!
//! ## Dry run
//!
//! ```text
//! 2024-01 (8 images)
//!     001 → 2024/index_2024-01_001.jpg (5 images)
//!     002 → 2024/index_2024-01_002.jpg (3 images)
//!
//! Would write 2 index images for 8 images in 1 month
//! ```
//!
//! ## Run
//!
//! ```text
//! 2024-01 (5 images)
//!     001 → 2024/index_2024-01.jpg (4 thumbnails)
//!         Skipped: 2024/2024-01/2024-01-01/bad.jpg (Cannot decode ...)
//!
//! Wrote 1 index image with 4 thumbnails; skipped 1 file
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{PageOutcome, PageReport};
use crate::index::{PlannedMonth, RunReport};
use crate::types::MonthKey;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 image`, `2 images`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Display `path` relative to `root` when it lies inside it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn month_header(key: MonthKey, images: usize) -> String {
    format!("{key} ({})", plural(images, "image"))
}

fn page_line(number: usize, output: &Path, root: &Path, detail: &str) -> String {
    format!(
        "{}{:0>3} → {} {detail}",
        indent(1),
        number,
        relative(output, root)
    )
}

// ============================================================================
// Dry run
// ============================================================================

pub fn format_plan(months: &[PlannedMonth], root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for month in months {
        lines.push(month_header(month.key, month.image_count));
        for page in &month.pages {
            lines.push(page_line(
                page.number,
                &page.output,
                root,
                &format!("({})", plural(page.files, "image")),
            ));
        }
    }

    let pages: usize = months.iter().map(|m| m.pages.len()).sum();
    let images: usize = months.iter().map(|m| m.image_count).sum();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Would write {} for {} in {}",
        plural(pages, "index image"),
        plural(images, "image"),
        plural(months.len(), "month")
    ));
    lines
}

pub fn print_plan(months: &[PlannedMonth], root: &Path) {
    for line in format_plan(months, root) {
        println!("{line}");
    }
}

// ============================================================================
// Run summary
// ============================================================================

fn page_lines(page: &PageReport, root: &Path) -> Vec<String> {
    let detail = match &page.outcome {
        PageOutcome::Written { thumbnails } => format!("({})", plural(*thumbnails, "thumbnail")),
        PageOutcome::Empty => "omitted, no readable images".to_string(),
        PageOutcome::Failed { reason } => format!("FAILED: {reason}"),
    };
    let mut lines = vec![page_line(page.number, &page.output, root, &detail)];
    lines.extend(page.failures.iter().map(|f| {
        format!(
            "{}Skipped: {} ({})",
            indent(2),
            relative(&f.path, root),
            f.reason
        )
    }));
    lines
}

pub fn format_run_summary(report: &RunReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for month in &report.months {
        lines.push(month_header(month.key, month.image_count));
        for page in &month.pages {
            lines.extend(page_lines(page, root));
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }

    let mut summary = format!(
        "Wrote {} with {}",
        plural(report.pages_written(), "index image"),
        plural(report.thumbnails(), "thumbnail")
    );
    if report.files_skipped() > 0 {
        summary.push_str(&format!("; skipped {}", plural(report.files_skipped(), "file")));
    }
    if report.pages_empty() > 0 {
        summary.push_str(&format!("; omitted {}", plural(report.pages_empty(), "empty page")));
    }
    if report.pages_failed() > 0 {
        summary.push_str(&format!("; {} failed", plural(report.pages_failed(), "page")));
    }
    lines.push(summary);
    lines
}

pub fn print_run_summary(report: &RunReport, root: &Path) {
    for line in format_run_summary(report, root) {
        println!("{line}");
    }
}
