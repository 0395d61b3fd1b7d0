//! Schema style references for blocks.
//!
//! Every paragraph in a section points at three entries of the template's
//! header: a paragraph shape (`paraPrIDRef`), a named style (`styleIDRef`)
//! and a character shape (`charPrIDRef`). Those ids only make sense for the
//! template they were taken from, so they live in a [`StyleCatalog`] that is
//! built once and handed to a [`StyleResolver`].

mod border;

pub use border::{classify, BorderCatalog, BorderClass, TableCellPosition};

use crate::error::{Error, Result};
use crate::model::{Block, CaptionKind, ListKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The ids a paragraph needs to pick up its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleTriple {
    /// Paragraph shape (`paraPrIDRef`)
    #[serde(alias = "paraPrIDRef")]
    pub paragraph_style_id: u32,

    /// Named style (`styleIDRef`)
    #[serde(alias = "styleIDRef")]
    pub block_style_id: u32,

    /// Character shape (`charPrIDRef`)
    #[serde(alias = "charPrIDRef")]
    pub run_style_id: u32,
}

impl StyleTriple {
    /// Create a triple from paragraph, block and run ids.
    pub const fn new(paragraph_style_id: u32, block_style_id: u32, run_style_id: u32) -> Self {
        Self {
            paragraph_style_id,
            block_style_id,
            run_style_id,
        }
    }
}

/// Semantic kinds a style can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKey {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Body,
    ListBullet,
    ListHanging,
    ListNumbered,
    Empty,
    TableCaption,
    FigureCaption,
    /// Paragraph that hosts a table object
    TableHost,
    /// Paragraph inside a table cell
    TableCell,
    /// Paragraph that hosts a picture object
    ImageHost,
    TocTitle,
    TocEntry,
}

impl StyleKey {
    /// Key for a heading level, if the level has one.
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(StyleKey::Heading1),
            2 => Some(StyleKey::Heading2),
            3 => Some(StyleKey::Heading3),
            4 => Some(StyleKey::Heading4),
            5 => Some(StyleKey::Heading5),
            _ => None,
        }
    }

    /// Key for a block. `None` means the block has no dedicated style.
    pub fn for_block(block: &Block) -> Option<Self> {
        match block {
            Block::Heading { level, .. } => Self::heading(*level),
            Block::BodyParagraph { .. } => Some(StyleKey::Body),
            Block::ListItem { kind, .. } => Some(match kind {
                ListKind::Bullet => StyleKey::ListBullet,
                ListKind::Hanging => StyleKey::ListHanging,
                ListKind::Numbered => StyleKey::ListNumbered,
            }),
            Block::Table(_) => Some(StyleKey::TableHost),
            Block::ImageRef { .. } => Some(StyleKey::ImageHost),
            Block::Caption { kind, .. } => Some(match kind {
                CaptionKind::Table => StyleKey::TableCaption,
                CaptionKind::Figure => StyleKey::FigureCaption,
            }),
            Block::Empty => Some(StyleKey::Empty),
        }
    }
}

/// Immutable mapping from style keys to template ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCatalog {
    /// Fallback for every key without an entry
    pub body: StyleTriple,

    /// Registered styles
    #[serde(default)]
    pub styles: HashMap<StyleKey, StyleTriple>,

    /// Table cell borders
    #[serde(default)]
    pub borders: BorderCatalog,
}

impl StyleCatalog {
    /// Create a catalog that only knows the body style.
    pub fn new(body: StyleTriple) -> Self {
        Self {
            body,
            styles: HashMap::new(),
            borders: BorderCatalog::default(),
        }
    }

    /// Register a style.
    pub fn with_style(mut self, key: StyleKey, triple: StyleTriple) -> Self {
        self.styles.insert(key, triple);
        self
    }

    /// Set the border catalog.
    pub fn with_borders(mut self, borders: BorderCatalog) -> Self {
        self.borders = borders;
        self
    }

    /// Load a catalog from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a key, falling back to the body style.
    pub fn get(&self, key: StyleKey) -> StyleTriple {
        self.styles.get(&key).copied().unwrap_or(self.body)
    }
}

impl Default for StyleCatalog {
    fn default() -> Self {
        let body = StyleTriple::new(17, 12, 4);
        let caption = StyleTriple::new(4, 12, 4);
        Self::new(body)
            .with_style(StyleKey::Heading1, StyleTriple::new(20, 5, 14))
            .with_style(StyleKey::Heading2, StyleTriple::new(21, 6, 8))
            .with_style(StyleKey::Heading3, StyleTriple::new(22, 7, 15))
            .with_style(StyleKey::Heading4, StyleTriple::new(23, 8, 15))
            .with_style(StyleKey::Heading5, StyleTriple::new(24, 9, 15))
            .with_style(StyleKey::Body, body)
            .with_style(StyleKey::ListBullet, StyleTriple::new(18, 14, 4))
            .with_style(StyleKey::ListHanging, StyleTriple::new(19, 13, 4))
            .with_style(StyleKey::ListNumbered, StyleTriple::new(19, 13, 4))
            .with_style(StyleKey::Empty, StyleTriple::new(6, 0, 5))
            .with_style(StyleKey::TableCaption, caption)
            .with_style(StyleKey::FigureCaption, caption)
            .with_style(StyleKey::TableHost, StyleTriple::new(4, 0, 4))
            .with_style(StyleKey::TableCell, StyleTriple::new(9, 20, 16))
            .with_style(StyleKey::ImageHost, StyleTriple::new(4, 12, 4))
            .with_style(StyleKey::TocTitle, StyleTriple::new(15, 1, 6))
            .with_style(StyleKey::TocEntry, StyleTriple::new(14, 4, 5))
    }
}

/// Resolves blocks to their style triple.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    catalog: StyleCatalog,
}

impl StyleResolver {
    /// Create a resolver over a catalog.
    pub fn new(catalog: StyleCatalog) -> Self {
        Self { catalog }
    }

    /// Get the catalog.
    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    /// Get the border catalog.
    pub fn borders(&self) -> &BorderCatalog {
        &self.catalog.borders
    }

    /// Style triple for a block; unknown kinds get the body style.
    pub fn resolve(&self, block: &Block) -> StyleTriple {
        StyleKey::for_block(block)
            .map(|key| self.catalog.get(key))
            .unwrap_or(self.catalog.body)
    }

    /// Style triple for a key.
    pub fn resolve_key(&self, key: StyleKey) -> StyleTriple {
        self.catalog.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let resolver = StyleResolver::default();
        assert_eq!(
            resolver.resolve(&Block::heading(1, "서론")),
            StyleTriple::new(20, 5, 14)
        );
        assert_eq!(
            resolver.resolve(&Block::heading(2, "배경")),
            StyleTriple::new(21, 6, 8)
        );
        assert_eq!(
            resolver.resolve(&Block::list_item("a", ListKind::Bullet)),
            StyleTriple::new(18, 14, 4)
        );
        assert_eq!(
            resolver.resolve(&Block::list_item("a", ListKind::Hanging)),
            StyleTriple::new(19, 13, 4)
        );
        assert_eq!(resolver.resolve(&Block::Empty), StyleTriple::new(6, 0, 5));
        assert_eq!(
            resolver.resolve_key(StyleKey::TableCell),
            StyleTriple::new(9, 20, 16)
        );
    }

    #[test]
    fn test_unknown_heading_falls_back_to_body() {
        let resolver = StyleResolver::default();
        assert_eq!(
            resolver.resolve(&Block::heading(7, "깊은 제목")),
            StyleTriple::new(17, 12, 4)
        );
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "body": {"paraPrIDRef": 1, "styleIDRef": 2, "charPrIDRef": 3},
            "styles": {
                "heading1": {"paragraph_style_id": 10, "block_style_id": 11, "run_style_id": 12}
            },
            "borders": {"header_left": 40}
        }"#;
        let catalog = StyleCatalog::from_json(json).unwrap();
        let resolver = StyleResolver::new(catalog);

        assert_eq!(
            resolver.resolve(&Block::heading(1, "x")),
            StyleTriple::new(10, 11, 12)
        );
        // missing keys fall back to body
        assert_eq!(
            resolver.resolve(&Block::paragraph("x")),
            StyleTriple::new(1, 2, 3)
        );
        assert_eq!(resolver.borders().header_left, 40);
        assert_eq!(resolver.borders().body_mid, 7);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(StyleCatalog::from_json("{").is_err());
    }
}
