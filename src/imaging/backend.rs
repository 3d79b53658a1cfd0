//! Imaging backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the only place pixels are touched. It
//! offers exactly the capabilities the contact-sheet pipeline needs:
//!
//! | Operation | Purpose |
//! |---|---|
//! | `check_output` | Can this backend encode the requested output format? |
//! | `thumbnail` | Decode one image and fit it into a framed box |
//! | `caption` | Render a line of text into a strip |
//! | `compose` | Place tiles on a canvas and write the index image |
//!
//! Tiles are an associated type, so the pipeline passes them from
//! `thumbnail`/`caption` to `compose` without knowing what they are.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate, `rawloader` and `ab_glyph`.

use super::params::{CaptionParams, ComposeParams, ThumbnailParams};
use crate::types::OutputFormat;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Imaging backend unavailable: {0}")]
    Unavailable(String),
}

/// Trait for imaging backends.
pub trait ImageBackend {
    /// In-memory image produced by `thumbnail`/`caption` and consumed by `compose`.
    type Tile;

    /// Fail with [`BackendError::Unavailable`] if `format` cannot be written.
    fn check_output(&self, format: OutputFormat) -> Result<(), BackendError>;

    /// Decode and fit one source image into its box.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Self::Tile, BackendError>;

    /// Render a caption strip.
    fn caption(&self, params: &CaptionParams) -> Result<Self::Tile, BackendError>;

    /// Composite tiles onto a canvas and write the result.
    fn compose(&self, params: &ComposeParams<'_, Self::Tile>) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Placement, Quality};
    use crate::types::Color;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;

    /// Mock backend that records operations instead of drawing.
    ///
    /// Tiles are labels (`thumb:<file name>`, `caption:<text>`), so tests can
    /// check exactly what was placed where. `compose` writes an empty file at
    /// the output path so file-placement tests see real files.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// File names whose `thumbnail` call fails.
        pub failing_sources: HashSet<String>,
        /// File names (of the output) whose `compose` call fails.
        pub failing_outputs: HashSet<String>,
        pub fail_captions: bool,
        pub unsupported_formats: Vec<OutputFormat>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct MockTile(pub String);

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Thumbnail {
            source: String,
            width: u32,
            height: u32,
        },
        Caption {
            text: String,
            width: u32,
            height: u32,
        },
        Compose {
            output: PathBuf,
            width: u32,
            height: u32,
            /// `(tile label, x, y)` in placement order.
            tiles: Vec<(String, u32, u32)>,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(sources: &[&str]) -> Self {
            Self {
                failing_sources: sources.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Recorded compose operations only.
        pub fn composes(&self) -> Vec<RecordedOp> {
            self.get_operations()
                .into_iter()
                .filter(|op| matches!(op, RecordedOp::Compose { .. }))
                .collect()
        }

        /// Thumbnail labels placed by each compose, in order.
        pub fn placed_thumbnails(&self) -> Vec<Vec<String>> {
            self.composes()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Compose { tiles, .. } => Some(
                        tiles
                            .into_iter()
                            .filter_map(|(label, _, _)| {
                                label.strip_prefix("thumb:").map(str::to_string)
                            })
                            .collect(),
                    ),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        type Tile = MockTile;

        fn check_output(&self, format: OutputFormat) -> Result<(), BackendError> {
            if self.unsupported_formats.contains(&format) {
                return Err(BackendError::Unavailable(format!(
                    "no encoder for {format}"
                )));
            }
            Ok(())
        }

        fn thumbnail(&self, params: &ThumbnailParams) -> Result<MockTile, BackendError> {
            let name = file_name(&params.source);
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source: name.clone(),
                width: params.width,
                height: params.height,
            });
            if self.failing_sources.contains(&name) {
                return Err(BackendError::Decode {
                    path: params.source.clone(),
                    reason: "mock decode failure".to_string(),
                });
            }
            Ok(MockTile(format!("thumb:{name}")))
        }

        fn caption(&self, params: &CaptionParams) -> Result<MockTile, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Caption {
                text: params.text.clone(),
                width: params.width,
                height: params.height,
            });
            if self.fail_captions {
                return Err(BackendError::ProcessingFailed(
                    "mock caption failure".to_string(),
                ));
            }
            Ok(MockTile(format!("caption:{}", params.text)))
        }

        fn compose(&self, params: &ComposeParams<'_, MockTile>) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Compose {
                output: params.output.clone(),
                width: params.width,
                height: params.height,
                tiles: params
                    .placements
                    .iter()
                    .map(|p| (p.tile.0.clone(), p.x, p.y))
                    .collect(),
            });
            if self.failing_outputs.contains(&file_name(&params.output)) {
                return Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock write failure",
                )));
            }
            std::fs::write(&params.output, b"")?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_thumbnail_and_fails_on_request() {
        let backend = MockBackend::failing_on(&["bad.jpg"]);
        let params = |source: &str| ThumbnailParams {
            source: PathBuf::from(source),
            width: 100,
            height: 80,
            background: Color::WHITE,
            frame: Some(Color::BLACK),
        };

        assert_eq!(
            backend.thumbnail(&params("/a/good.jpg")).unwrap(),
            MockTile("thumb:good.jpg".to_string())
        );
        assert!(matches!(
            backend.thumbnail(&params("/a/bad.jpg")),
            Err(BackendError::Decode { .. })
        ));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail { source, width: 100, height: 80 } if source == "good.jpg"
        ));
    }

    #[test]
    fn mock_compose_records_tiles_and_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let backend = MockBackend::new();
        let tile = MockTile("thumb:a.jpg".to_string());
        let output = tmp.path().join("index_2024-01.jpg");

        backend
            .compose(&ComposeParams {
                output: output.clone(),
                width: 200,
                height: 100,
                background: Color::WHITE,
                quality: Quality::default(),
                placements: vec![Placement {
                    tile: &tile,
                    x: 10,
                    y: 10,
                }],
            })
            .unwrap();

        assert!(output.exists());
        assert_eq!(backend.placed_thumbnails(), vec![vec!["a.jpg".to_string()]]);
    }

    #[test]
    fn mock_reports_unsupported_format() {
        let backend = MockBackend {
            unsupported_formats: vec![OutputFormat::Webp],
            ..MockBackend::default()
        };
        assert!(backend.check_output(OutputFormat::Jpg).is_ok());
        assert!(matches!(
            backend.check_output(OutputFormat::Webp),
            Err(BackendError::Unavailable(_))
        ));
    }
}
