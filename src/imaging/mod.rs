//! Image processing: thumbnails, captions and page composition.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (sniffed), `rawloader` for camera raw |
//! | **Thumbnail** | aspect-preserving fit, letterboxed and framed |
//! | **Caption** | `ab_glyph` text on a strip |
//! | **Compose** | `imageops::overlay` onto one canvas, encoded by extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for pagination and grid geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`render_page`], combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
pub mod params;
mod raw;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    GridLayout, MAX_CANVAS_PIXELS, MAX_CANVAS_SIDE, Page, page_count, paginate,
};
pub use operations::{FileFailure, PageOutcome, PageReport, render_page};
pub use params::Quality;
pub use rust_backend::RustBackend;
