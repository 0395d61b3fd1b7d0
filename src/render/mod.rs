//! Serialization of parsed documents into OWPML section XML.

mod options;
mod result;
mod section;
mod toc;
mod xml;

pub use options::{LayoutOptions, LineSegment};
pub use result::SectionStats;
pub use section::{SectionBody, SectionWriter};
pub use toc::{render_toc, TocBody, TOC_MAX_LEVEL};
pub use xml::{Tag, XmlWriter};

use crate::error::Result;
use crate::model::{Document, ImageAsset};
use crate::style::StyleResolver;
use std::collections::BTreeMap;

/// Serialize every section of a document.
pub fn render_document(
    doc: &Document,
    resolver: &StyleResolver,
    layout: &LayoutOptions,
    assets: &BTreeMap<String, ImageAsset>,
) -> Result<SectionBody> {
    let mut writer = SectionWriter::new(resolver, layout, assets);
    writer.write_document(doc)?;
    writer.finish()
}
