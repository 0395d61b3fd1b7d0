//! Table of contents.

use super::section::SectionWriter;
use super::LayoutOptions;
use crate::error::Result;
use crate::model::Outline;
use crate::style::{StyleKey, StyleResolver};
use std::collections::BTreeMap;

/// Deepest heading level listed in the table of contents.
pub const TOC_MAX_LEVEL: u8 = 3;

/// A serialized table of contents.
#[derive(Debug, Clone, Default)]
pub struct TocBody {
    /// Body XML
    pub xml: String,
    /// Number of heading entries
    pub entries: usize,
}

/// Serialize a table of contents for `outline`.
///
/// Writes the title, an empty spacer, then one entry per heading of levels
/// 1 to 3. Each entry ends in a dot-leader tab; page numbers are left to the
/// word processor.
pub fn render_toc(
    outline: &Outline,
    resolver: &StyleResolver,
    layout: &LayoutOptions,
) -> Result<TocBody> {
    let assets = BTreeMap::new();
    let mut writer = SectionWriter::new(resolver, layout, &assets);

    writer.write_styled(StyleKey::TocTitle, &layout.toc_title)?;
    writer.write_styled(StyleKey::Empty, "")?;

    let mut entries = 0usize;
    for item in outline.up_to_level(TOC_MAX_LEVEL) {
        let Some((tab_width, indent)) = layout.toc_level(item.level) else {
            continue;
        };
        let text = format!("{}{}", " ".repeat(indent), item.title);
        writer.write_tab_entry(StyleKey::TocEntry, &text, tab_width)?;
        entries += 1;
    }
    log::debug!("table of contents has {} entries", entries);

    Ok(TocBody {
        xml: writer.finish()?.xml,
        entries,
    })
}
