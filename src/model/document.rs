//! Document-level types.

use super::Block;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed report: ordered sections plus what was collected while parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Sections in output order (body first, then appendix)
    pub sections: Vec<Section>,

    /// Table and figure captions found in the text
    pub captions: CaptionCatalog,

    /// Diagram sources awaiting rendering, in document order
    pub diagrams: Vec<DiagramSource>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section to the document.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Body sections in order.
    pub fn body_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::Body)
    }

    /// Appendix sections in order.
    pub fn appendix_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| s.kind == SectionKind::Appendix)
    }

    /// Total number of blocks across all sections.
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(|s| s.blocks.len()).sum()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.block_count() == 0
    }

    /// Outline of the body, used for the table of contents.
    pub fn outline(&self) -> Outline {
        let mut outline = Outline::new();
        for section in self.body_sections() {
            for item in &section.outline.items {
                outline.add_item(item.clone());
            }
        }
        outline
    }

    /// Iterate over every image placeholder's figure id.
    pub fn figure_ids(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.blocks.iter())
            .filter_map(Block::figure_id)
    }
}

/// One labelled input file after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Label given by the caller (e.g. "Ⅰ. 서론")
    pub label: String,

    /// Where the section lands
    pub kind: SectionKind,

    /// Parsed blocks
    pub blocks: Vec<Block>,

    /// Headings as written, numbering kept
    pub outline: Outline,
}

impl Section {
    /// Create a new section.
    pub fn new(label: impl Into<String>, kind: SectionKind, blocks: Vec<Block>) -> Self {
        Self {
            label: label.into(),
            kind,
            blocks,
            outline: Outline::new(),
        }
    }

    /// Set the section outline.
    pub fn with_outline(mut self, outline: Outline) -> Self {
        self.outline = outline;
        self
    }

    /// Count blocks matching a predicate.
    pub fn count(&self, pred: impl Fn(&Block) -> bool) -> usize {
        self.blocks.iter().filter(|b| pred(b)).count()
    }
}

/// Whether a section belongs to the main body or the appendix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Main body
    #[default]
    Body,
    /// Appendix, placed after a page break
    Appendix,
}

/// Flat heading outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Headings in document order
    pub items: Vec<OutlineItem>,
}

impl Outline {
    /// Create a new empty outline.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an item to the outline.
    pub fn add_item(&mut self, item: OutlineItem) {
        self.items.push(item);
    }

    /// Check if the outline is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items at or above the given depth.
    pub fn up_to_level(&self, max_level: u8) -> impl Iterator<Item = &OutlineItem> {
        self.items.iter().filter(move |i| i.level <= max_level)
    }
}

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    /// Heading text as written
    pub title: String,

    /// Heading level (1-5)
    pub level: u8,
}

impl OutlineItem {
    /// Create a new outline item.
    pub fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            level,
        }
    }
}

/// Table and figure titles keyed by caption id ("1-2").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionCatalog {
    /// `[표X-N]` captions
    pub tables: BTreeMap<String, String>,

    /// `[그림X-N]` captions
    pub figures: BTreeMap<String, String>,
}

impl CaptionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another catalog into this one. Existing ids keep their title.
    pub fn merge(&mut self, other: CaptionCatalog) {
        for (id, title) in other.tables {
            self.tables.entry(id).or_insert(title);
        }
        for (id, title) in other.figures {
            self.figures.entry(id).or_insert(title);
        }
    }

    /// Title of a figure.
    pub fn figure_title(&self, figure_id: &str) -> Option<&str> {
        self.figures.get(figure_id).map(String::as_str)
    }

    /// Title of a table.
    pub fn table_title(&self, table_id: &str) -> Option<&str> {
        self.tables.get(table_id).map(String::as_str)
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.figures.is_empty()
    }
}

/// Diagram markup extracted from a fenced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramSource {
    /// Figure the diagram belongs to
    pub figure_id: String,

    /// Diagram source text
    pub source: String,
}

impl DiagramSource {
    /// Create a new diagram source.
    pub fn new(figure_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            figure_id: figure_id.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_sections() {
        let mut doc = Document::new();
        doc.add_section(Section::new(
            "Ⅰ. 서론",
            SectionKind::Body,
            vec![Block::heading(1, "서론"), Block::image("1-1")],
        ));
        doc.add_section(Section::new(
            "부록",
            SectionKind::Appendix,
            vec![Block::paragraph("참고")],
        ));

        assert_eq!(doc.body_sections().count(), 1);
        assert_eq!(doc.appendix_sections().count(), 1);
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.figure_ids().collect::<Vec<_>>(), vec!["1-1"]);
    }

    #[test]
    fn test_outline_only_from_body() {
        let mut doc = Document::new();
        let mut outline = Outline::new();
        outline.add_item(OutlineItem::new("Ⅰ. 서론", 1));
        outline.add_item(OutlineItem::new("1. 배경", 2));
        doc.add_section(Section::new("a", SectionKind::Body, vec![]).with_outline(outline.clone()));
        doc.add_section(Section::new("b", SectionKind::Appendix, vec![]).with_outline(outline));

        let merged = doc.outline();
        assert_eq!(merged.items.len(), 2);
        assert_eq!(merged.up_to_level(1).count(), 1);
    }

    #[test]
    fn test_caption_merge_keeps_first() {
        let mut a = CaptionCatalog::new();
        a.figures.insert("1-1".into(), "연구 모형".into());
        let mut b = CaptionCatalog::new();
        b.figures.insert("1-1".into(), "다른 제목".into());
        b.tables.insert("2-1".into(), "표본 구성".into());

        a.merge(b);
        assert_eq!(a.figure_title("1-1"), Some("연구 모형"));
        assert_eq!(a.table_title("2-1"), Some("표본 구성"));
    }
}
