//! Image asset registration.
//!
//! [`ImageAssetManager`] hands out package-wide asset ids, computes display
//! sizes and content hashes, and later writes the registered bytes into the
//! package's binary-asset directory.

mod probe;

pub use probe::{pixels_to_hwpunit, probe_image, ImageInfo, DEFAULT_DPI, HWPUNIT_PER_INCH};

#[cfg(test)]
pub(crate) use probe::tests::png_image;

use crate::error::{Error, Result};
use crate::model::{ImageAsset, MediaType};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::{Digest, Md5};
use std::fs;
use std::path::{Path, PathBuf};

/// Width of the template's text area in HWPUNIT.
pub const DEFAULT_MAX_DISPLAY_WIDTH: u32 = 43936;

/// Fit an image into a width budget, keeping its aspect ratio.
///
/// Images that already fit keep their natural size; wider images are scaled
/// down to exactly `max_display_width`. Nothing is ever scaled up.
pub fn scale_to_fit(natural_width: u32, natural_height: u32, max_display_width: u32) -> (u32, u32) {
    if natural_width <= max_display_width {
        return (natural_width, natural_height);
    }
    let w = natural_width as u64;
    let height = (natural_height as u64 * max_display_width as u64 + w / 2) / w;
    (max_display_width, height as u32)
}

/// Base64 of the MD5 digest, the manifest `hashkey` format.
pub fn content_hash(data: &[u8]) -> String {
    STANDARD.encode(Md5::digest(data))
}

/// Registers images and assigns them ids above the template's own.
#[derive(Debug)]
pub struct ImageAssetManager {
    next_id: u32,
    max_display_width: u32,
    registered: Vec<(ImageAsset, Vec<u8>)>,
}

impl ImageAssetManager {
    /// Create a manager whose first asset gets `first_id`.
    pub fn new(first_id: u32) -> Self {
        Self {
            next_id: first_id.max(1),
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            registered: Vec::new(),
        }
    }

    /// Create a manager for a package whose highest asset id is `highest`.
    pub fn after(highest: u32) -> Self {
        Self::new(highest.saturating_add(1))
    }

    /// Set the display width budget.
    pub fn with_max_display_width(mut self, width: u32) -> Self {
        self.max_display_width = width;
        self
    }

    /// Id the next registration will receive.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Register image bytes with a known natural size in HWPUNIT.
    pub fn register_asset(
        &mut self,
        figure_id: impl Into<String>,
        data: Vec<u8>,
        natural_width: u32,
        natural_height: u32,
    ) -> Result<ImageAsset> {
        let figure_id = figure_id.into();
        let media_type = MediaType::detect(&data).ok_or_else(|| {
            Error::Image(format!("figure {}: unrecognized image format", figure_id))
        })?;

        let content_hash = content_hash(&data);
        if let Some((existing, _)) = self
            .registered
            .iter()
            .find(|(a, _)| a.content_hash == content_hash)
        {
            log::debug!(
                "figure {} has the same bytes as figure {}",
                figure_id,
                existing.figure_id
            );
        }

        let (display_width, display_height) =
            scale_to_fit(natural_width, natural_height, self.max_display_width);

        let asset = ImageAsset {
            figure_id,
            source_path: None,
            asset_id: self.next_id,
            content_hash,
            natural_width,
            natural_height,
            display_width,
            display_height,
            media_type,
        };
        self.next_id += 1;

        log::debug!(
            "registered {} for figure {} ({}x{} -> {}x{})",
            asset.item_id(),
            asset.figure_id,
            natural_width,
            natural_height,
            display_width,
            display_height
        );
        self.registered.push((asset.clone(), data));
        Ok(asset)
    }

    /// Read, probe and register an image file.
    pub fn register_file(
        &mut self,
        figure_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<ImageAsset> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let info = probe_image(&data)?;
        let (w, h) = info.natural_size();

        let mut asset = self.register_asset(figure_id, data, w, h)?;
        asset.source_path = Some(path.to_path_buf());
        if let Some((last, _)) = self.registered.last_mut() {
            last.source_path = asset.source_path.clone();
        }
        Ok(asset)
    }

    /// Registered assets in registration order.
    pub fn assets(&self) -> impl Iterator<Item = &ImageAsset> {
        self.registered.iter().map(|(a, _)| a)
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Check if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Write every registered image into `bin_dir`.
    pub fn write_to(&self, bin_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(bin_dir)?;
        let mut written = Vec::with_capacity(self.registered.len());
        for (asset, data) in &self.registered {
            let path = bin_dir.join(asset.file_name());
            fs::write(&path, data)?;
            written.push(path);
        }
        Ok(written)
    }
}
