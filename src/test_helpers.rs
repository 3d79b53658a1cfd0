//! Shared test utilities: archive fixtures and scan-result extractors.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = archive(&[
//!     ("2024/2024-01/2024-01-01", &["a.jpg", "b.jpg"]),
//!     ("2024/2024-01/2024-01-02", &["c.jpg"]),
//! ]);
//! let groups = scan(tmp.path()).unwrap();
//! assert_eq!(file_names(&groups[0]), vec!["a.jpg", "b.jpg", "c.jpg"]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::scan::MonthGroup;

// =========================================================================
// Fixture setup
// =========================================================================

/// Build an archive in a temp directory.
///
/// Each entry is `(relative directory, file names)`. Directories are created
/// even when the file list is empty; files are created empty, which is enough
/// for scanning and for the mock backend.
pub fn archive(layout: &[(&str, &[&str])]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (dir, files) in layout {
        let dir_path = tmp.path().join(dir);
        std::fs::create_dir_all(&dir_path).unwrap();
        for file in *files {
            std::fs::write(dir_path.join(file), "").unwrap();
        }
    }
    tmp
}

/// Write a small but real JPEG so the `image`-crate backend can decode it.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Write bytes that carry an image extension but cannot be decoded.
pub fn write_corrupt(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"definitely not a jpeg").unwrap();
}

/// `n` synthetic paths `IMG_0001.jpg`, `IMG_0002.jpg`, … for pagination tests.
pub fn numbered_paths(n: usize) -> Vec<PathBuf> {
    (1..=n)
        .map(|i| PathBuf::from(format!("IMG_{i:04}.jpg")))
        .collect()
}

// =========================================================================
// Extractors
// =========================================================================

/// File names of a month group, in group order.
pub fn file_names(group: &MonthGroup) -> Vec<String> {
    group
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

/// Sorted file names directly inside `dir`.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
