//! Camera raw decoding for thumbnails.
//!
//! `rawloader` provides the sensor data; this module turns it into a small
//! RGB preview. Bayer sensors are demosaiced by 2×2 binning (every block of
//! four photosites becomes one pixel), which halves the resolution and is
//! plenty for a thumbnail. Three-channel (linear DNG) data is used as is.
//! Black/white levels and camera white balance are applied, followed by a
//! plain 1/2.2 gamma.

use super::backend::BackendError;
use image::{DynamicImage, RgbImage};
use log::debug;
use std::path::Path;

pub fn decode_raw(path: &Path) -> Result<DynamicImage, BackendError> {
    let raw = rawloader::decode_file(path).map_err(|e| BackendError::Decode {
        path: path.to_path_buf(),
        reason: format!("{e:?}"),
    })?;

    debug!(
        "Raw {}: {}x{} cpp={} cfa={}",
        path.display(),
        raw.width,
        raw.height,
        raw.cpp,
        raw.cfa.name
    );

    let samples: Vec<f32> = match &raw.data {
        rawloader::RawImageData::Integer(data) => data.iter().map(|&v| v as f32).collect(),
        rawloader::RawImageData::Float(data) => data.clone(),
    };

    let levels = Levels {
        black: raw.blacklevels.map(|v| v as f32),
        white: raw.whitelevels.map(|v| v as f32),
        wb: white_balance(raw.wb_coeffs),
    };

    let img = match raw.cpp {
        1 => demosaic_binned(&samples, raw.width, raw.height, &levels, |row, col| {
            raw.cfa.color_at(row, col)
        }),
        3 => linear_rgb(&samples, raw.width, raw.height, &levels),
        cpp => {
            return Err(BackendError::Decode {
                path: path.to_path_buf(),
                reason: format!("unsupported raw layout ({cpp} components per pixel)"),
            });
        }
    };

    img.map(DynamicImage::ImageRgb8)
        .ok_or_else(|| BackendError::Decode {
            path: path.to_path_buf(),
            reason: "raw image has no pixels".to_string(),
        })
}

struct Levels {
    black: [f32; 4],
    white: [f32; 4],
    wb: [f32; 4],
}

impl Levels {
    /// Normalize a sample of color `c` (0=R, 1=G, 2=B, 3=second green) to 0..1, white balanced.
    fn normalize(&self, c: usize, value: f32) -> f32 {
        let c = c.min(3);
        let range = (self.white[c] - self.black[c]).max(1.0);
        ((value - self.black[c]) / range * self.wb[c]).clamp(0.0, 1.0)
    }
}

/// Camera white balance scaled so green is 1.0; neutral when unusable.
fn white_balance(coeffs: [f32; 4]) -> [f32; 4] {
    let green = coeffs[1];
    if coeffs[..3].iter().any(|c| !c.is_finite() || *c <= 0.0) {
        return [1.0; 4];
    }
    let fourth = if coeffs[3].is_finite() && coeffs[3] > 0.0 {
        coeffs[3] / green
    } else {
        1.0
    };
    [coeffs[0] / green, 1.0, coeffs[2] / green, fourth]
}

fn to_u8(linear: f32) -> u8 {
    (linear.powf(1.0 / 2.2) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Bin each 2×2 Bayer block into one RGB pixel.
fn demosaic_binned(
    samples: &[f32],
    width: usize,
    height: usize,
    levels: &Levels,
    color_at: impl Fn(usize, usize) -> usize,
) -> Option<RgbImage> {
    let (out_w, out_h) = (width / 2, height / 2);
    if out_w == 0 || out_h == 0 || samples.len() < width * height {
        return None;
    }

    let mut img = RgbImage::new(out_w as u32, out_h as u32);
    for by in 0..out_h {
        for bx in 0..out_w {
            let mut sum = [0.0f32; 3];
            let mut count = [0u32; 3];
            for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let (row, col) = (by * 2 + dy, bx * 2 + dx);
                let color = color_at(row, col);
                let value = levels.normalize(color, samples[row * width + col]);
                // The fourth CFA color is a second green
                let channel = if color >= 3 { 1 } else { color };
                sum[channel] += value;
                count[channel] += 1;
            }
            let avg = |c: usize| {
                if count[c] == 0 {
                    0.0
                } else {
                    sum[c] / count[c] as f32
                }
            };
            img.put_pixel(
                bx as u32,
                by as u32,
                image::Rgb([to_u8(avg(0)), to_u8(avg(1)), to_u8(avg(2))]),
            );
        }
    }
    Some(img)
}

fn linear_rgb(samples: &[f32], width: usize, height: usize, levels: &Levels) -> Option<RgbImage> {
    if width == 0 || height == 0 || samples.len() < width * height * 3 {
        return None;
    }
    let mut img = RgbImage::new(width as u32, height as u32);
    for (i, pixel) in img.pixels_mut().enumerate() {
        let base = i * 3;
        *pixel = image::Rgb([
            to_u8(levels.normalize(0, samples[base])),
            to_u8(levels.normalize(1, samples[base + 1])),
            to_u8(levels.normalize(2, samples[base + 2])),
        ]);
    }
    Some(img)
}
