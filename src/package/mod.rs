//! HWPX package handling.
//!
//! A template package is read once, copied to a scratch directory, patched
//! (section bodies, binary assets, manifest items) and zipped back up with
//! the `mimetype` member first and stored.

mod archive;
mod assembler;
mod manifest;
mod preamble;
mod xml;

pub use archive::{repackage, TemplatePackage, HWPX_MIMETYPE, MIMETYPE_MEMBER};
pub use assembler::{AssembleOptions, AssemblyReport, AssemblyStage, PackageAssembler};
pub use manifest::{image_number, Manifest};
pub use preamble::SectionPreamble;
pub use xml::validate_xml;
