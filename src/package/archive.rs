//! Reading the template archive and writing the output archive.

use super::manifest::image_number;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the format marker member.
pub const MIMETYPE_MEMBER: &str = "mimetype";

/// Content of the format marker.
pub const HWPX_MIMETYPE: &str = "application/hwp+zip";

/// A template package held in memory.
///
/// Opening reads every member once; the file on disk is never written.
#[derive(Debug, Clone)]
pub struct TemplatePackage {
    path: PathBuf,
    members: BTreeMap<String, Vec<u8>>,
}

impl TemplatePackage {
    /// Read a package from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingInput(format!("template {}", path.display())));
        }

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let mut members = BTreeMap::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry
                .enclosed_name()
                .ok_or_else(|| Error::Archive(format!("unsafe member name {:?}", entry.name())))?;
            let name = member_name(&name);

            let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            entry.read_to_end(&mut data)?;
            members.insert(name, data);
        }

        if !members.contains_key(MIMETYPE_MEMBER) {
            return Err(Error::MissingInput(format!(
                "{} member in {}",
                MIMETYPE_MEMBER,
                path.display()
            )));
        }

        log::debug!("opened {} ({} members)", path.display(), members.len());
        Ok(Self {
            path: path.to_path_buf(),
            members,
        })
    }

    /// Path the package was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Member names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the package has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if a member exists.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Raw bytes of a member.
    pub fn member(&self, name: &str) -> Option<&[u8]> {
        self.members.get(name).map(Vec::as_slice)
    }

    /// A member decoded as UTF-8, or `MissingInput` if it is absent.
    pub fn member_text(&self, name: &str) -> Result<String> {
        let data = self
            .member(name)
            .ok_or_else(|| Error::MissingInput(format!("member {}", name)))?;
        String::from_utf8(data.to_vec()).map_err(|e| Error::Xml(format!("{}: {}", name, e)))
    }

    /// Content of the format marker, trimmed.
    pub fn mimetype(&self) -> Option<&str> {
        self.member(MIMETYPE_MEMBER)
            .and_then(|d| std::str::from_utf8(d).ok())
            .map(str::trim)
    }

    /// Highest `image{N}` number among files under `bin_dir`, 0 if none.
    pub fn highest_bin_id(&self, bin_dir: &str) -> u32 {
        let prefix = format!("{}/", bin_dir.trim_end_matches('/'));
        self.names()
            .filter(|n| n.starts_with(&prefix))
            .filter_map(image_number)
            .max()
            .unwrap_or(0)
    }

    /// Write every member below `dir`.
    pub fn extract_to(&self, dir: &Path) -> Result<()> {
        for (name, data) in &self.members {
            let target = dir.join(name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, data)?;
        }
        Ok(())
    }
}

/// Zip a directory tree into a package at `output`.
///
/// `mimetype` is written first and stored; every other file follows in
/// sorted path order, deflated. The archive is built in a temporary file
/// next to `output` and moved into place only once complete, so a failure
/// leaves any existing `output` as it was.
pub fn repackage(source_dir: &Path, output: &Path) -> Result<u64> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    let files = write_archive(source_dir, temp.as_file_mut())?;
    temp.persist(output)
        .map_err(|e| Error::ArchiveWrite(format!("{}: {}", output.display(), e)))?;

    log::debug!("wrote {} files to {}", files, output.display());
    Ok(files)
}

fn write_archive(source_dir: &Path, file: &mut File) -> Result<u64> {
    let mimetype = fs::read(source_dir.join(MIMETYPE_MEMBER))
        .map_err(|_| Error::MissingInput(format!("{} member", MIMETYPE_MEMBER)))?;

    let mut names = Vec::new();
    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(write_error)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(source_dir).map_err(write_error)?;
        let name = member_name(relative);
        if name != MIMETYPE_MEMBER {
            names.push(name);
        }
    }
    names.sort();

    let mut zip = ZipWriter::new(file);
    zip.start_file(MIMETYPE_MEMBER, stored()).map_err(write_error)?;
    zip.write_all(&mimetype).map_err(write_error)?;

    for name in &names {
        let data = fs::read(source_dir.join(name))?;
        zip.start_file(name.as_str(), deflated()).map_err(write_error)?;
        zip.write_all(&data).map_err(write_error)?;
    }
    zip.finish().map_err(write_error)?;

    Ok(names.len() as u64 + 1)
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn write_error(e: impl std::fmt::Display) -> Error {
    Error::ArchiveWrite(e.to_string())
}

/// Forward-slash member name for a relative path.
fn member_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
