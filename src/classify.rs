//! Directory-name and file-extension classification.
//!
//! The archive layout is recognized purely by name:
//!
//! | Level | Pattern | Example |
//! |---|---|---|
//! | Year | `DDDD` | `2024` |
//! | Month | `DDDD-DD` | `2024-01` |
//! | Day | `DDDD-DD-DD` | `2024-01-15` |
//!
//! Names are matched exactly; `2024-01-15 party` is not a day directory.
//! These are the only "parsing" rules in the tool, kept here as plain
//! predicates so the scanner stays a traversal and nothing more.

use crate::types::MonthKey;
use std::ffi::OsStr;
use std::path::Path;

/// Common raster formats decoded by the `image` crate.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];

/// Camera raw formats decoded through `rawloader`.
pub const RAW_EXTENSIONS: &[&str] = &["cr2", "nef", "arw", "orf", "rw2", "raf", "dng"];

/// Match `name` against a pattern where `D` is an ASCII digit and any other
/// byte must match literally.
fn matches_digit_pattern(name: &OsStr, pattern: &str) -> bool {
    let name = name.as_encoded_bytes();
    name.len() == pattern.len()
        && name
            .iter()
            .zip(pattern.bytes())
            .all(|(&c, p)| if p == b'D' { c.is_ascii_digit() } else { c == p })
}

pub fn is_year_dir(name: impl AsRef<OsStr>) -> bool {
    matches_digit_pattern(name.as_ref(), "DDDD")
}

pub fn is_month_dir(name: impl AsRef<OsStr>) -> bool {
    matches_digit_pattern(name.as_ref(), "DDDD-DD")
}

pub fn is_day_dir(name: impl AsRef<OsStr>) -> bool {
    matches_digit_pattern(name.as_ref(), "DDDD-DD-DD")
}

/// Value of a run of ASCII digits.
fn digits_value(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}

/// Parse a `YYYY-MM` directory name into its month key.
pub fn parse_month_dir(name: impl AsRef<OsStr>) -> Option<MonthKey> {
    let name = name.as_ref();
    if !is_month_dir(name) {
        return None;
    }
    let bytes = name.as_encoded_bytes();
    let year = u16::try_from(digits_value(&bytes[..4])).ok()?;
    let month = u8::try_from(digits_value(&bytes[5..7])).ok()?;
    Some(MonthKey::new(year, month))
}

/// Extension bytes of a non-hidden file.
///
/// Works on the raw name, so files whose names are not valid UTF-8 are
/// still classified by their extension.
fn extension_bytes(path: &Path) -> Option<&[u8]> {
    if path.file_name()?.as_encoded_bytes().starts_with(b".") {
        return None;
    }
    path.extension().map(OsStr::as_encoded_bytes)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    extension_bytes(path).is_some_and(|ext| {
        extensions
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate.as_bytes()))
    })
}

/// True for any extension the tool can render, raster or raw.
pub fn is_image_file(path: &Path) -> bool {
    has_extension_in(path, IMAGE_EXTENSIONS) || has_extension_in(path, RAW_EXTENSIONS)
}

pub fn is_raw_file(path: &Path) -> bool {
    has_extension_in(path, RAW_EXTENSIONS)
}
