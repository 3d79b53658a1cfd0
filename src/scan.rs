//! Archive scanning.
//!
//! Walks a date-structured archive and groups image files by month:
//!
//! ```text
//! archive/
//! ├── 2024/                        # year     (DDDD)
//! │   ├── 2024-01/                 # month    (DDDD-DD)   → one MonthGroup
//! │   │   ├── 2024-01-01/          # day      (DDDD-DD-DD)
//! │   │   │   ├── IMG_0001.jpg
//! │   │   │   └── IMG_0002.CR2
//! │   │   └── 2024-01-02/
//! │   │       └── IMG_0003.jpg
//! │   └── index_2024-01.jpg        # previous output, ignored (not in a day dir)
//! └── scans/                       # not a year, ignored
//! ```
//!
//! Only files directly inside a day directory count, and a month directory
//! only counts inside the year directory it names. Entries are visited in
//! file-name order at every level, so the order of a month's files is stable
//! from run to run. Anything that doesn't match the layout is skipped
//! silently; unreadable subdirectories are skipped with a warning.

use crate::classify::{is_day_dir, is_image_file, is_month_dir, is_year_dir, parse_month_dir};
use crate::types::MonthKey;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Archive root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Archive root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot read archive root {0}: {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),
}

/// All qualifying image files of one month, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup {
    pub key: MonthKey,
    pub files: Vec<PathBuf>,
}

/// Depth of image files below the archive root: year / month / day / file.
const FILE_DEPTH: usize = 4;

/// Scan the archive and return one group per month, sorted by year then month.
///
/// Months without any qualifying image are omitted.
pub fn scan(root: &Path) -> Result<Vec<MonthGroup>, ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|e| ScanError::Unreadable(root.to_path_buf(), e))?;

    let mut months: BTreeMap<MonthKey, Vec<PathBuf>> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(FILE_DEPTH)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_archive_entry);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable archive entry: {e}");
                continue;
            }
        };
        if entry.depth() != FILE_DEPTH || !entry.file_type().is_file() {
            continue;
        }
        let Some(key) = month_of(entry.path()) else {
            continue;
        };
        months.entry(key).or_default().push(entry.into_path());
    }

    let groups: Vec<MonthGroup> = months
        .into_iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(key, files)| MonthGroup { key, files })
        .collect();

    debug!(
        "Scanned {}: {} month(s), {} image(s)",
        root.display(),
        groups.len(),
        groups.iter().map(|g| g.files.len()).sum::<usize>()
    );

    Ok(groups)
}

/// Prune the walk to the year / month / day layout.
fn is_archive_entry(entry: &DirEntry) -> bool {
    let name = entry.file_name();
    let is_dir = entry.file_type().is_dir();
    match entry.depth() {
        0 => true,
        1 => is_dir && is_year_dir(name),
        2 => is_dir && is_month_dir(name) && in_own_year(entry),
        3 => is_dir && is_day_dir(name),
        FILE_DEPTH => !is_dir && is_image_file(entry.path()),
        _ => false,
    }
}

/// A month directory must sit in the year directory its name starts with.
fn in_own_year(month: &DirEntry) -> bool {
    let year = month
        .path()
        .parent()
        .and_then(Path::file_name)
        .map(OsStr::as_encoded_bytes);
    let name = month.file_name().as_encoded_bytes();
    if year.is_some_and(|year| name.starts_with(year)) {
        return true;
    }
    warn!(
        "Skipping {}: month directory is not in its own year directory",
        month.path().display()
    );
    false
}

/// Month key of a file at `YYYY/YYYY-MM/YYYY-MM-DD/file`, from its month directory.
fn month_of(file: &Path) -> Option<MonthKey> {
    let month_dir = file.parent()?.parent()?;
    parse_month_dir(month_dir.file_name()?)
}
