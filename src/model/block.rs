//! Block-level content types.

use serde::{Deserialize, Serialize};

/// One semantic unit of parsed Markdown content.
///
/// Blocks are produced once per parse pass and never mutated afterwards.
/// Their order in a section is the final document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading (level 1-5)
    Heading {
        /// Heading level
        level: u8,
        /// Heading text with manual numbering removed
        text: String,
    },

    /// A plain body paragraph
    BodyParagraph {
        /// Paragraph text
        text: String,
    },

    /// A list item
    ListItem {
        /// Item text without the list marker
        text: String,
        /// Presentation kind
        kind: ListKind,
    },

    /// A pipe table
    Table(TableBlock),

    /// Placeholder for a rendered diagram
    ImageRef {
        /// Figure identifier, e.g. "1-2"
        figure_id: String,
    },

    /// A table or figure caption line
    Caption {
        /// Caption text including the `[표Ⅰ-1]` marker
        text: String,
        /// What the caption labels
        kind: CaptionKind,
    },

    /// An empty paragraph
    Empty,
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    /// Create a body paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::BodyParagraph { text: text.into() }
    }

    /// Create a list item.
    pub fn list_item(text: impl Into<String>, kind: ListKind) -> Self {
        Block::ListItem {
            text: text.into(),
            kind,
        }
    }

    /// Create an image placeholder.
    pub fn image(figure_id: impl Into<String>) -> Self {
        Block::ImageRef {
            figure_id: figure_id.into(),
        }
    }

    /// Create a caption block.
    pub fn caption(text: impl Into<String>, kind: CaptionKind) -> Self {
        Block::Caption {
            text: text.into(),
            kind,
        }
    }

    /// Get the text carried by this block, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading { text, .. }
            | Block::BodyParagraph { text }
            | Block::ListItem { text, .. }
            | Block::Caption { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this is an empty paragraph.
    pub fn is_empty(&self) -> bool {
        matches!(self, Block::Empty)
    }

    /// Check if this is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this is an image placeholder.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::ImageRef { .. })
    }

    /// Figure id of an image placeholder.
    pub fn figure_id(&self) -> Option<&str> {
        match self {
            Block::ImageRef { figure_id } => Some(figure_id),
            _ => None,
        }
    }

    /// Check if this is a caption of the given kind.
    pub fn is_caption(&self, kind: CaptionKind) -> bool {
        matches!(self, Block::Caption { kind: k, .. } if *k == kind)
    }
}

/// How a list item is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Compact bullet
    Bullet,
    /// Numbered item (`1. `)
    Numbered,
    /// Full-width paragraph with hanging indent
    Hanging,
}

/// What a caption labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionKind {
    /// `[표Ⅰ-1]`
    Table,
    /// `[그림Ⅰ-1]`
    Figure,
}

/// A pipe table.
///
/// Rows may be ragged; they are kept exactly as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Header cells
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Create a table from header and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Total number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Number of columns, taken from the header.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Check whether any data row differs in length from the header.
    pub fn is_ragged(&self) -> bool {
        self.rows.iter().any(|r| r.len() != self.headers.len())
    }

    /// Iterate over all rows, header first.
    pub fn all_rows(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(self.headers.as_slice()).chain(self.rows.iter().map(|r| r.as_slice()))
    }
}
