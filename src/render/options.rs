//! Layout constants for section XML.

use crate::assets::DEFAULT_MAX_DISPLAY_WIDTH;
use serde::{Deserialize, Serialize};

/// Geometry and id seeds used when serializing blocks.
///
/// All lengths are HWPUNIT (1/7200 inch). The defaults match an A4 template
/// with the usual margins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// First paragraph id
    pub paragraph_id_start: u64,

    /// First table id
    pub table_id_start: u64,

    /// Id assigned to paragraphs inside table cells
    pub cell_paragraph_id: u64,

    /// Picture ids are this base plus the asset id
    pub picture_id_base: u64,

    /// Picture instance ids are this base plus the asset id
    pub picture_instid_base: u64,

    /// Picture z-order is this base plus the asset id
    pub picture_z_order_base: u64,

    /// Table width
    pub table_width: u32,

    /// Height of each table row
    pub row_height: u32,

    /// Margin around tables and inside cells
    pub cell_margin: u32,

    /// Width budget for images
    pub max_display_width: u32,

    /// Line segment written under picture paragraphs
    pub picture_line: LineSegment,

    /// TOC tab widths for heading levels 1, 2 and 3
    pub toc_tab_widths: [u32; 3],

    /// TOC indent in spaces for heading levels 1, 2 and 3
    pub toc_indents: [usize; 3],

    /// TOC title text
    pub toc_title: String,
}

impl LayoutOptions {
    /// Create layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table width.
    pub fn with_table_width(mut self, width: u32) -> Self {
        self.table_width = width;
        self
    }

    /// Set the table row height.
    pub fn with_row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Set the image width budget.
    pub fn with_max_display_width(mut self, width: u32) -> Self {
        self.max_display_width = width;
        self
    }

    /// Set the first paragraph and table ids.
    pub fn with_id_seeds(mut self, paragraph: u64, table: u64) -> Self {
        self.paragraph_id_start = paragraph;
        self.table_id_start = table;
        self
    }

    /// Set the TOC tab widths.
    pub fn with_toc_tab_widths(mut self, widths: [u32; 3]) -> Self {
        self.toc_tab_widths = widths;
        self
    }

    /// Set the TOC title.
    pub fn with_toc_title(mut self, title: impl Into<String>) -> Self {
        self.toc_title = title.into();
        self
    }

    /// Width of one cell in a table with `columns` columns.
    pub fn cell_width(&self, columns: usize) -> u32 {
        let columns = u32::try_from(columns.max(1)).unwrap_or(u32::MAX);
        self.table_width / columns
    }

    /// TOC tab width and indent for a heading level, if it is listed.
    pub fn toc_level(&self, level: u8) -> Option<(u32, usize)> {
        let index = usize::from(level).checked_sub(1)?;
        Some((*self.toc_tab_widths.get(index)?, *self.toc_indents.get(index)?))
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            paragraph_id_start: 500_000_001,
            table_id_start: 900_000_001,
            cell_paragraph_id: 2_147_483_648,
            picture_id_base: 2_000_000_000,
            picture_instid_base: 927_519_913,
            picture_z_order_base: 10,
            table_width: 43660,
            row_height: 3000,
            cell_margin: 141,
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            picture_line: LineSegment::default(),
            toc_tab_widths: [38752, 34792, 25000],
            toc_indents: [0, 0, 3],
            toc_title: "목 차".to_string(),
        }
    }
}

/// `<hp:lineseg>` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSegment {
    pub vertpos: u32,
    pub vertsize: u32,
    pub textheight: u32,
    pub baseline: u32,
    pub spacing: u32,
    pub horzsize: u32,
    pub flags: u32,
}

impl Default for LineSegment {
    fn default() -> Self {
        Self {
            vertpos: 6440,
            vertsize: 1100,
            textheight: 1100,
            baseline: 935,
            spacing: 880,
            horzsize: DEFAULT_MAX_DISPLAY_WIDTH,
            flags: 1_441_792,
        }
    }
}
