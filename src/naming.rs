//! Naming conventions for output files and captions.
//!
//! ## Index Files
//!
//! | Month | Pages | File name |
//! |---|---|---|
//! | 2024-01 | 1 | `index_2024-01.jpg` |
//! | 2024-01 | 3 | `index_2024-01_001.jpg` … `index_2024-01_003.jpg` |
//!
//! Without an output directory the file lands in the month's year directory
//! (`<root>/2024/index_2024-01.jpg`). With one, every file lands directly in
//! it under the same name, so no year subdirectory is created.
//!
//! ## Captions
//!
//! Captions show the source file name. Names longer than
//! [`CAPTION_MAX_CHARS`] characters are cut to that many characters and
//! suffixed with `…`.

use crate::types::{MonthKey, OutputFormat};
use std::path::{Path, PathBuf};

pub const CAPTION_MAX_CHARS: usize = 25;

/// Output file name for page `page` (1-based) of `total` pages of a month.
pub fn index_file_name(key: MonthKey, page: usize, total: usize, format: OutputFormat) -> String {
    if total > 1 {
        format!("index_{key}_{page:03}.{}", format.extension())
    } else {
        format!("index_{key}.{}", format.extension())
    }
}

/// Full output path for one page.
pub fn index_path(
    root: &Path,
    output_dir: Option<&Path>,
    key: MonthKey,
    page: usize,
    total: usize,
    format: OutputFormat,
) -> PathBuf {
    let file_name = index_file_name(key, page, total, format);
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => root.join(key.year_dir()).join(file_name),
    }
}

/// Caption for a source image: its file name, truncated.
pub fn caption_text(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    truncate_caption(&name, CAPTION_MAX_CHARS)
}

/// Keep the first `max` characters of `text`, appending `…` if anything was cut.
pub fn truncate_caption(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Footer line for multi-page months.
pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {page} of {total}")
}
