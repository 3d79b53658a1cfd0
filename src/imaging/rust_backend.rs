//! Pure Rust imaging backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Decode (camera raw) | `rawloader` + 2×2 binning ([`raw`](super::raw)) |
//! | Shrink | `DynamicImage::thumbnail_exact` |
//! | Enlarge | `DynamicImage::resize_exact` with `Triangle` filter |
//! | Caption text | `ab_glyph` outlines, alpha-blended onto the strip |
//! | Composite | `image::imageops::overlay` |
//! | Encode | `JpegEncoder::new_with_quality`, PNG/WebP via `save_with_format` |
//!
//! Captions need a TrueType/OpenType font. One is taken from an explicit
//! path when given, otherwise from a short list of common system locations.
//! With no font available captions are left blank.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{centered_offset, fit_within};
use super::params::{CaptionParams, ComposeParams, Quality, ThumbnailParams};
use super::raw::decode_raw;
use crate::classify::is_raw_file;
use crate::types::{Color, OutputFormat};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use log::{debug, warn};
use std::path::Path;

/// Fonts tried, in order, when none is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Backend built on the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    font: Option<FontVec>,
}

impl RustBackend {
    /// Create a backend with captions drawn in the font at `font_path`, or
    /// in the first system font found when `None`.
    ///
    /// An explicit font that cannot be loaded is an error. A missing system
    /// font only disables caption text.
    pub fn new(font_path: Option<&Path>) -> Result<Self, BackendError> {
        let font = match font_path {
            Some(path) => Some(load_font(path)?),
            None => find_system_font(),
        };
        if font.is_none() {
            warn!("No usable font found; captions will be blank (set --font to choose one)");
        }
        Ok(Self { font })
    }

    /// Backend that renders blank caption strips.
    #[cfg(test)]
    fn without_font() -> Self {
        Self { font: None }
    }
}

fn load_font(path: &Path) -> Result<FontVec, BackendError> {
    let bytes = std::fs::read(path).map_err(|e| {
        BackendError::Unavailable(format!("cannot read font {}: {e}", path.display()))
    })?;
    FontVec::try_from_vec(bytes).map_err(|e| {
        BackendError::Unavailable(format!("invalid font {}: {e}", path.display()))
    })
}

fn find_system_font() -> Option<FontVec> {
    SYSTEM_FONTS.iter().map(Path::new).find_map(|path| {
        if !path.is_file() {
            return None;
        }
        match load_font(path) {
            Ok(font) => {
                debug!("Caption font: {}", path.display());
                Some(font)
            }
            Err(e) => {
                debug!("Skipping font candidate: {e}");
                None
            }
        }
    })
}

/// Load and decode an image from disk, sniffing the format from its content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    if is_raw_file(path) {
        return decode_raw(path);
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn rgb(color: Color) -> Rgb<u8> {
    Rgb(color.0)
}

/// Draw a 1px border along the edges of `img`.
fn draw_frame(img: &mut RgbImage, color: Color) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    for x in 0..w {
        img.put_pixel(x, 0, rgb(color));
        img.put_pixel(x, h - 1, rgb(color));
    }
    for y in 0..h {
        img.put_pixel(0, y, rgb(color));
        img.put_pixel(w - 1, y, rgb(color));
    }
}

fn blend(dst: &mut Rgb<u8>, src: Rgb<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    for (d, s) in dst.0.iter_mut().zip(src.0) {
        *d = (*d as f32 * (1.0 - a) + s as f32 * a).round() as u8;
    }
}

/// Draw one line of `text` centered in `img`, shrinking the font if the line
/// would not fit the width.
fn draw_text(img: &mut RgbImage, font: &FontVec, text: &str, font_size: f32, color: Color) {
    let (width, height) = img.dimensions();
    let text_width = |scale: PxScale| {
        let scaled = font.as_scaled(scale);
        text.chars()
            .map(|c| scaled.h_advance(scaled.glyph_id(c)))
            .sum::<f32>()
    };

    let mut scale = PxScale::from(font_size.max(1.0));
    let natural = text_width(scale);
    let available = width.saturating_sub(4) as f32;
    if natural > available && natural > 0.0 {
        scale = PxScale::from((font_size * available / natural).max(1.0));
    }

    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let baseline = (height as f32 - (ascent - descent)) / 2.0 + ascent;
    let mut x = ((width as f32 - text_width(scale)) / 2.0).max(0.0);

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        let glyph = glyph_id.with_scale_and_position(scale, point(x, baseline));
        if let Some(outlined) = scaled.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                    blend(img.get_pixel_mut(px as u32, py as u32), rgb(color), coverage);
                }
            });
        }
        x += scaled.h_advance(glyph_id);
    }
}

fn encode(canvas: RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!("unknown output format for {}: {e}", path.display()))
    })?;

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let writer = std::io::BufWriter::new(file);
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value());
            DynamicImage::ImageRgb8(canvas)
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))
        }
        other => canvas
            .save_with_format(path, other)
            .map_err(|e| BackendError::ProcessingFailed(format!("{other:?} encode failed: {e}"))),
    }
}

impl ImageBackend for RustBackend {
    type Tile = RgbImage;

    fn check_output(&self, format: OutputFormat) -> Result<(), BackendError> {
        if format.image_format().writing_enabled() {
            Ok(())
        } else {
            Err(BackendError::Unavailable(format!(
                "no {format} encoder compiled in"
            )))
        }
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<RgbImage, BackendError> {
        let img = load_image(&params.source)?;
        let (w, h) = fit_within((img.width(), img.height()), (params.width, params.height));

        let scaled = if w <= img.width() && h <= img.height() {
            img.thumbnail_exact(w, h)
        } else {
            img.resize_exact(w, h, FilterType::Triangle)
        };

        let mut tile = RgbImage::from_pixel(params.width, params.height, rgb(params.background));
        let (x, y) = centered_offset((w, h), (params.width, params.height));
        imageops::overlay(&mut tile, &scaled.to_rgb8(), x as i64, y as i64);

        if let Some(frame) = params.frame {
            draw_frame(&mut tile, frame);
        }
        Ok(tile)
    }

    fn caption(&self, params: &CaptionParams) -> Result<RgbImage, BackendError> {
        let mut strip = RgbImage::from_pixel(params.width, params.height, rgb(params.background));
        if let Some(font) = &self.font {
            draw_text(&mut strip, font, &params.text, params.font_size, params.color);
        }
        Ok(strip)
    }

    fn compose(&self, params: &ComposeParams<'_, RgbImage>) -> Result<(), BackendError> {
        let mut canvas = RgbImage::from_pixel(params.width, params.height, rgb(params.background));
        for placement in &params.placements {
            imageops::overlay(
                &mut canvas,
                placement.tile,
                placement.x as i64,
                placement.y as i64,
            );
        }

        encode(canvas, &params.output, params.quality).inspect_err(|_| {
            // Never leave a truncated index image behind
            let _ = std::fs::remove_file(&params.output);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Placement;
    use crate::test_helpers::{write_corrupt, write_jpeg};
    use tempfile::TempDir;

    fn thumb_params(source: &Path) -> ThumbnailParams {
        ThumbnailParams {
            source: source.to_path_buf(),
            width: 150,
            height: 150,
            background: Color::WHITE,
            frame: Some(Color::BLACK),
        }
    }

    fn caption_params(text: &str) -> CaptionParams {
        CaptionParams {
            text: text.to_string(),
            width: 150,
            height: 40,
            font_size: 14.0,
            color: Color::BLACK,
            background: Color::WHITE,
        }
    }

    // =========================================================================
    // thumbnail
    // =========================================================================

    #[test]
    fn thumbnail_fills_exact_box() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        write_jpeg(&source, 400, 300);

        let tile = RustBackend::without_font()
            .thumbnail(&thumb_params(&source))
            .unwrap();
        assert_eq!(tile.dimensions(), (150, 150));
    }

    #[test]
    fn thumbnail_letterboxes_and_frames() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        write_jpeg(&source, 400, 300);

        let tile = RustBackend::without_font()
            .thumbnail(&thumb_params(&source))
            .unwrap();

        // 400×300 → 150×113, centered with 18px bands above and below
        assert_eq!(tile.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(tile.get_pixel(149, 149), &Rgb([0, 0, 0]));
        assert_eq!(tile.get_pixel(75, 5), &Rgb([255, 255, 255]));
        assert_eq!(tile.get_pixel(75, 144), &Rgb([255, 255, 255]));
    }

    #[test]
    fn thumbnail_enlarges_small_images() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("tiny.png");
        RgbImage::from_pixel(10, 10, Rgb([200, 0, 0]))
            .save(&source)
            .unwrap();

        let tile = RustBackend::without_font()
            .thumbnail(&ThumbnailParams {
                frame: None,
                ..thumb_params(&source)
            })
            .unwrap();
        assert_eq!(tile.dimensions(), (150, 150));
        assert_eq!(tile.get_pixel(75, 75), &Rgb([200, 0, 0]));
    }

    #[test]
    fn thumbnail_sniffs_mislabeled_content() {
        let tmp = TempDir::new().unwrap();
        let jpeg = tmp.path().join("real.jpg");
        write_jpeg(&jpeg, 64, 48);
        let mislabeled = tmp.path().join("actually_jpeg.png");
        std::fs::copy(&jpeg, &mislabeled).unwrap();

        assert!(
            RustBackend::without_font()
                .thumbnail(&thumb_params(&mislabeled))
                .is_ok()
        );
    }

    #[test]
    fn thumbnail_of_corrupt_file_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        write_corrupt(&source);

        let result = RustBackend::without_font().thumbnail(&thumb_params(&source));
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn thumbnail_of_missing_file_is_io_error() {
        let result =
            RustBackend::without_font().thumbnail(&thumb_params(Path::new("/nonexistent/a.jpg")));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    // =========================================================================
    // caption
    // =========================================================================

    #[test]
    fn caption_without_font_is_blank_strip() {
        let backend = RustBackend::without_font();
        assert!(backend.font.is_none());
        let strip = backend.caption(&caption_params("IMG_0001.jpg")).unwrap();
        assert_eq!(strip.dimensions(), (150, 40));
        assert!(strip.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn caption_with_system_font_draws_ink() {
        let Some(font) = find_system_font() else {
            return;
        };
        let backend = RustBackend { font: Some(font) };
        let strip = backend.caption(&caption_params("IMG_0001.jpg")).unwrap();
        assert_eq!(strip.dimensions(), (150, 40));
        assert!(strip.pixels().any(|p| *p != Rgb([255, 255, 255])));
    }

    #[test]
    fn explicit_missing_font_is_unavailable() {
        let result = RustBackend::new(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(result, Err(BackendError::Unavailable(_))));
    }

    #[test]
    fn explicit_invalid_font_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bogus.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            RustBackend::new(Some(&path)),
            Err(BackendError::Unavailable(_))
        ));
    }

    // =========================================================================
    // compose / check_output
    // =========================================================================

    fn compose_to(output: &Path) -> Result<(), BackendError> {
        let tile = RgbImage::from_pixel(20, 20, Rgb([255, 0, 0]));
        RustBackend::without_font().compose(&ComposeParams {
            output: output.to_path_buf(),
            width: 100,
            height: 60,
            background: Color::WHITE,
            quality: Quality::default(),
            placements: vec![
                Placement {
                    tile: &tile,
                    x: 10,
                    y: 10,
                },
                Placement {
                    tile: &tile,
                    x: 90,
                    y: 50,
                },
            ],
        })
    }

    #[test]
    fn compose_writes_decodable_jpeg() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("index_2024-01.jpg");
        compose_to(&output).unwrap();

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (100, 60));
    }

    #[test]
    fn compose_writes_png_losslessly() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("index_2024-01.png");
        compose_to(&output).unwrap();

        let written = image::open(&output).unwrap().to_rgb8();
        assert_eq!(written.get_pixel(15, 15), &Rgb([255, 0, 0]));
        assert_eq!(written.get_pixel(50, 5), &Rgb([255, 255, 255]));
        // Tile overhanging the canvas edge is clipped
        assert_eq!(written.get_pixel(95, 55), &Rgb([255, 0, 0]));
    }

    #[test]
    fn compose_to_unknown_extension_fails_without_file() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("index_2024-01.xyz");
        assert!(compose_to(&output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn compose_into_missing_directory_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("missing").join("index_2024-01.jpg");
        assert!(matches!(compose_to(&output), Err(BackendError::Io(_))));
    }

    #[test]
    fn all_output_formats_are_writable() {
        let backend = RustBackend::without_font();
        for format in [OutputFormat::Jpg, OutputFormat::Png, OutputFormat::Webp] {
            assert!(backend.check_output(format).is_ok(), "{format}");
        }
    }
}
