//! Image header probing.
//!
//! Pixel size comes from the `image` crate's header readers; PNG density is
//! taken from the `pHYs` chunk through the `png` decoder. Other formats use
//! [`DEFAULT_DPI`].

use crate::error::{Error, Result};
use crate::model::MediaType;
use image::ImageReader;
use std::io::Cursor;

/// Density assumed when the image does not record one.
pub const DEFAULT_DPI: f64 = 96.0;

/// HWPUNIT per inch.
pub const HWPUNIT_PER_INCH: u32 = 7200;

const METRES_PER_INCH: f64 = 0.0254;

/// Header facts about a raster image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    /// Width in pixels
    pub pixel_width: u32,
    /// Height in pixels
    pub pixel_height: u32,
    /// Horizontal density in dots per inch
    pub dpi: f64,
    /// Image format
    pub media_type: MediaType,
}

impl ImageInfo {
    /// Natural size in HWPUNIT at the recorded density.
    pub fn natural_size(&self) -> (u32, u32) {
        (
            pixels_to_hwpunit(self.pixel_width, self.dpi),
            pixels_to_hwpunit(self.pixel_height, self.dpi),
        )
    }
}

/// Convert a pixel length to HWPUNIT.
pub fn pixels_to_hwpunit(pixels: u32, dpi: f64) -> u32 {
    let dpi = if dpi.is_finite() && dpi > 0.0 {
        dpi
    } else {
        DEFAULT_DPI
    };
    let units = (pixels as f64 * HWPUNIT_PER_INCH as f64 / dpi).round();
    if units >= u32::MAX as f64 {
        u32::MAX
    } else {
        units as u32
    }
}

/// Read format, size and density from image bytes.
pub fn probe_image(data: &[u8]) -> Result<ImageInfo> {
    let media_type = MediaType::detect(data)
        .ok_or_else(|| Error::Image("unrecognized image format".to_string()))?;

    let (pixel_width, pixel_height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| Error::Image(e.to_string()))?;

    if pixel_width == 0 || pixel_height == 0 {
        return Err(Error::Image("image has zero size".to_string()));
    }

    let dpi = match media_type {
        MediaType::Png => png_dpi(data)?,
        _ => None,
    };

    Ok(ImageInfo {
        pixel_width,
        pixel_height,
        dpi: dpi.unwrap_or(DEFAULT_DPI),
        media_type,
    })
}

/// Horizontal density from `pHYs`, if recorded in metres.
fn png_dpi(data: &[u8]) -> Result<Option<f64>> {
    let reader = png::Decoder::new(Cursor::new(data))
        .read_info()
        .map_err(|e| Error::Image(format!("PNG header: {}", e)))?;

    Ok(reader.info().pixel_dims.and_then(|dims| match dims.unit {
        png::Unit::Meter if dims.xppu > 0 => Some(dims.xppu as f64 * METRES_PER_INCH),
        _ => None,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a black RGB PNG, optionally with a `pHYs` density.
    pub(crate) fn png_image(width: u32, height: u32, pixels_per_metre: Option<u32>) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, width, height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            if let Some(ppm) = pixels_per_metre {
                encoder.set_pixel_dims(Some(png::PixelDimensions {
                    xppu: ppm,
                    yppu: ppm,
                    unit: png::Unit::Meter,
                }));
            }
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&vec![0; (width * height * 3) as usize])
                .unwrap();
        }
        data
    }

    #[test]
    fn test_probe_png_default_dpi() {
        let info = probe_image(&png_image(1920, 1080, None)).unwrap();
        assert_eq!(info.pixel_width, 1920);
        assert_eq!(info.pixel_height, 1080);
        assert_eq!(info.dpi, DEFAULT_DPI);
        assert_eq!(info.natural_size(), (144000, 81000));
    }

    #[test]
    fn test_probe_png_phys() {
        // 7874 px/m is 199.9996 dpi
        let info = probe_image(&png_image(400, 200, Some(7874))).unwrap();
        assert!((info.dpi - 199.9996).abs() < 1e-6);
        assert_eq!(info.natural_size(), (14400, 7200));
    }

    #[test]
    fn test_probe_png_density_not_rounded() {
        // 3780 px/m is 96.012 dpi, not 96
        let info = probe_image(&png_image(960, 10, Some(3780))).unwrap();
        assert!((info.dpi - 96.012).abs() < 1e-9);
        assert_eq!(info.natural_size().0, 71991);
        assert_ne!(info.natural_size().0, pixels_to_hwpunit(960, 96.0));
    }

    #[test]
    fn test_probe_jpeg() {
        let mut data = Vec::new();
        image::RgbImage::new(64, 48)
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Jpeg)
            .unwrap();

        let info = probe_image(&data).unwrap();
        assert_eq!(info.media_type, MediaType::Jpeg);
        assert_eq!((info.pixel_width, info.pixel_height), (64, 48));
        assert_eq!(info.dpi, DEFAULT_DPI);
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(probe_image(b"not an image at all").is_err());
        let mut truncated = png_image(10, 10, None);
        truncated.truncate(18);
        assert!(probe_image(&truncated).is_err());
    }

    #[test]
    fn test_pixels_to_hwpunit() {
        assert_eq!(pixels_to_hwpunit(96, 96.0), 7200);
        assert_eq!(pixels_to_hwpunit(96, 0.0), 7200);
        assert_eq!(pixels_to_hwpunit(150, 300.0), 3600);
        assert_eq!(pixels_to_hwpunit(960, 96.012), 71991);
    }
}
