//! Binary image assets embedded into the package.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A raster image registered into the package's binary store.
///
/// Sizes are in HWPUNIT (1/7200 inch). An asset is created once per
/// successful diagram render and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Figure the image belongs to
    pub figure_id: String,

    /// File the bytes were read from, if any
    pub source_path: Option<PathBuf>,

    /// Package-wide numeric id (`image{id}`)
    pub asset_id: u32,

    /// Base64 MD5 of the raw bytes
    pub content_hash: String,

    /// Natural width
    pub natural_width: u32,

    /// Natural height
    pub natural_height: u32,

    /// Width after fitting to the page
    pub display_width: u32,

    /// Height after fitting to the page
    pub display_height: u32,

    /// Image format
    pub media_type: MediaType,
}

impl ImageAsset {
    /// Manifest item id, also used as `binaryItemIDRef`.
    pub fn item_id(&self) -> String {
        format!("image{}", self.asset_id)
    }

    /// File name inside the binary-asset directory.
    pub fn file_name(&self) -> String {
        format!("image{}.{}", self.asset_id, self.media_type.extension())
    }

    /// Package-relative path under the given binary directory.
    pub fn href(&self, bin_dir: &str) -> String {
        format!("{}/{}", bin_dir.trim_end_matches('/'), self.file_name())
    }

    /// Horizontal scale applied for display.
    pub fn scale_x(&self) -> f64 {
        ratio(self.display_width, self.natural_width)
    }

    /// Vertical scale applied for display.
    pub fn scale_y(&self) -> f64 {
        ratio(self.display_height, self.natural_height)
    }
}

fn ratio(display: u32, natural: u32) -> f64 {
    if natural == 0 {
        1.0
    } else {
        display as f64 / natural as f64
    }
}

/// Supported raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
    /// Windows bitmap
    Bmp,
}

impl MediaType {
    /// Detect the format from magic bytes.
    ///
    /// Formats the package cannot carry give `None`.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Png => Some(MediaType::Png),
            ImageFormat::Jpeg => Some(MediaType::Jpeg),
            ImageFormat::Gif => Some(MediaType::Gif),
            ImageFormat::Bmp => Some(MediaType::Bmp),
            _ => None,
        }
    }

    /// MIME type written into the manifest.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Gif => "image/gif",
            MediaType::Bmp => "image/bmp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Png => "png",
            MediaType::Jpeg => "jpg",
            MediaType::Gif => "gif",
            MediaType::Bmp => "bmp",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}
