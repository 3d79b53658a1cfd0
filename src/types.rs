//! Shared value types used across the scan, layout and render stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A calendar month in the archive, ordered by year then month.
///
/// Displays as `YYYY-MM`, which is also the form used in output file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: u16,
    pub month: u8,
}

impl MonthKey {
    pub fn new(year: u16, month: u8) -> Self {
        Self { year, month }
    }

    /// Four-digit year, as used for the year directory.
    pub fn year_dir(&self) -> String {
        format!("{:04}", self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Encoded format of the written index images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    Png,
    Webp,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Webp => image::ImageFormat::WebP,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!(
                "unsupported output format '{other}' (expected jpg, png or webp)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An opaque RGB color, written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([0xff, 0xff, 0xff]);
    pub const BLACK: Color = Color([0x00, 0x00, 0x00]);
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() {
            return Err(format!("invalid color '{s}' (expected #rgb or #rrggbb)"));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(format!("invalid color '{s}' (expected #rgb or #rrggbb)")),
        };
        let mut rgb = [0u8; 3];
        for (i, channel) in rgb.iter_mut().enumerate() {
            *channel = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
                .map_err(|_| format!("invalid color '{s}' (expected #rgb or #rrggbb)"))?;
        }
        Ok(Color(rgb))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        let [r, g, b] = color.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// The run's sizing, layout and output settings. Immutable once resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailSpec {
    /// Thumbnail box width in pixels.
    pub width: u32,
    /// Thumbnail box height in pixels.
    pub height: u32,
    pub per_row: u32,
    /// Thumbnail cap per output image; larger months are paginated.
    pub max_per_page: usize,
    /// Flat output directory. `None` writes into each year directory.
    pub output_dir: Option<PathBuf>,
    /// Horizontal and vertical spacing around each cell.
    pub margin: u32,
    pub caption_height: u32,
    /// Extra band for the `Page N of M` line on multi-page months.
    pub footer_height: u32,
    pub format: OutputFormat,
    pub quality: u8,
    pub background: Color,
    pub frame_color: Color,
    pub caption_color: Color,
    pub font_size: f32,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
            per_row: 10,
            max_per_page: 200,
            output_dir: None,
            margin: 20,
            caption_height: 40,
            footer_height: 40,
            format: OutputFormat::Jpg,
            quality: 90,
            background: Color::WHITE,
            frame_color: Color::BLACK,
            caption_color: Color::BLACK,
            font_size: 14.0,
        }
    }
}
