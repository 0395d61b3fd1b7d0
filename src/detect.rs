//! HWPX format detection.
//!
//! An HWPX package is a ZIP archive whose first local entry is an
//! uncompressed `mimetype` member. Detection reads only that entry.

use crate::error::{Error, Result};
use crate::package::{HWPX_MIMETYPE, MIMETYPE_MEMBER};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// HWPX format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwpxFormat {
    /// Content of the `mimetype` member
    pub mimetype: String,
}

impl HwpxFormat {
    /// Check if the marker is the standard HWPX one.
    pub fn is_standard(&self) -> bool {
        self.mimetype == HWPX_MIMETYPE
    }
}

impl std::fmt::Display for HwpxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HWPX ({})", self.mimetype)
    }
}

/// ZIP local file header signature: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const LOCAL_HEADER_LEN: usize = 30;
/// Longest mimetype read from the marker
const MAX_MIMETYPE_LEN: usize = 64;

/// Detect HWPX format from a file path.
///
/// # Example
/// ```no_run
/// use mdhwpx::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("template.hwpx").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<HwpxFormat> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(256);
    file.take(256).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect HWPX format from the first bytes of a file.
///
/// # Returns
/// * `Ok(HwpxFormat)` if the data starts with a stored `mimetype` entry
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<HwpxFormat> {
    if data.len() < LOCAL_HEADER_LEN || !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let method = le_u16(data, 8);
    let size = le_u32(data, 18) as usize;
    let name_len = le_u16(data, 26) as usize;
    let extra_len = le_u16(data, 28) as usize;

    let name_end = LOCAL_HEADER_LEN + name_len;
    if data.len() < name_end || &data[LOCAL_HEADER_LEN..name_end] != MIMETYPE_MEMBER.as_bytes() {
        return Err(Error::UnknownFormat);
    }
    // compressed marker cannot be read in place
    if method != 0 || size == 0 || size > MAX_MIMETYPE_LEN {
        return Err(Error::UnknownFormat);
    }

    let start = name_end + extra_len;
    let content = data
        .get(start..start + size)
        .ok_or(Error::UnknownFormat)?;
    let mimetype = std::str::from_utf8(content)
        .map_err(|_| Error::UnknownFormat)?
        .trim()
        .to_string();

    if !mimetype.starts_with("application/") {
        return Err(Error::UnknownFormat);
    }
    Ok(HwpxFormat { mimetype })
}

fn le_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn le_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Check if a file is an HWPX package.
pub fn is_hwpx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start an HWPX package.
pub fn is_hwpx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn package(first: &str, method: CompressionMethod, content: &[u8]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(method);
        zip.start_file(first, options).unwrap();
        zip.write_all(content).unwrap();
        zip.start_file("Contents/section0.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<hs:sec/>").unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_detect_hwpx() {
        let data = package("mimetype", CompressionMethod::Stored, HWPX_MIMETYPE.as_bytes());
        let format = detect_format_from_bytes(&data).unwrap();
        assert_eq!(format.mimetype, HWPX_MIMETYPE);
        assert!(format.is_standard());
        assert_eq!(format.to_string(), "HWPX (application/hwp+zip)");
    }

    #[test]
    fn test_detect_wrong_first_member() {
        let data = package("Contents/x.xml", CompressionMethod::Stored, b"application/hwp+zip");
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_compressed_marker() {
        let data = package("mimetype", CompressionMethod::Deflated, HWPX_MIMETYPE.as_bytes());
        assert!(!is_hwpx_bytes(&data));
    }

    #[test]
    fn test_detect_not_zip() {
        assert!(!is_hwpx_bytes(b""));
        assert!(!is_hwpx_bytes(b"%PDF-1.7\n%test"));
        assert!(!is_hwpx_bytes(&[0u8; 64]));
    }

    #[test]
    fn test_is_hwpx_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.hwpx");
        std::fs::write(
            &path,
            package("mimetype", CompressionMethod::Stored, HWPX_MIMETYPE.as_bytes()),
        )
        .unwrap();
        assert!(is_hwpx(&path));
        assert!(!is_hwpx(dir.path().join("none.hwpx")));
    }
}
