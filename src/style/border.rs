//! Position-based table cell borders.
//!
//! The template defines a closed set of border/fill entries for table cells:
//! one per combination of row band (header, body, footer) and column side
//! (left, mid, right). [`classify`] picks the class from the cell position
//! alone and [`BorderCatalog`] maps it to the template's `borderFillIDRef`.

use serde::{Deserialize, Serialize};

/// One of the nine cell border classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderClass {
    /// First row, first column
    HeaderLeft,
    /// First row, inner column
    HeaderMid,
    /// First row, last column
    HeaderRight,
    /// Inner row, first column
    BodyLeft,
    /// Inner row, inner column
    BodyMid,
    /// Inner row, last column
    BodyRight,
    /// Last row, first column
    FooterLeft,
    /// Last row, inner column
    FooterMid,
    /// Last row, last column
    FooterRight,
}

impl BorderClass {
    /// All classes in row-major order.
    pub const ALL: [BorderClass; 9] = [
        BorderClass::HeaderLeft,
        BorderClass::HeaderMid,
        BorderClass::HeaderRight,
        BorderClass::BodyLeft,
        BorderClass::BodyMid,
        BorderClass::BodyRight,
        BorderClass::FooterLeft,
        BorderClass::FooterMid,
        BorderClass::FooterRight,
    ];

    /// Symbolic name, e.g. "header-left".
    pub fn name(self) -> &'static str {
        match self {
            BorderClass::HeaderLeft => "header-left",
            BorderClass::HeaderMid => "header-mid",
            BorderClass::HeaderRight => "header-right",
            BorderClass::BodyLeft => "body-left",
            BorderClass::BodyMid => "body-mid",
            BorderClass::BodyRight => "body-right",
            BorderClass::FooterLeft => "footer-left",
            BorderClass::FooterMid => "footer-mid",
            BorderClass::FooterRight => "footer-right",
        }
    }
}

impl std::fmt::Display for BorderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell's place in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCellPosition {
    /// Zero-based row, header is 0
    pub row: usize,
    /// Zero-based column
    pub col: usize,
    /// Rows in the table, header included
    pub total_rows: usize,
    /// Columns in the table
    pub total_cols: usize,
}

impl TableCellPosition {
    /// Create a new position.
    pub fn new(row: usize, col: usize, total_rows: usize, total_cols: usize) -> Self {
        Self {
            row,
            col,
            total_rows,
            total_cols,
        }
    }

    /// Border class of this position.
    pub fn classify(&self) -> BorderClass {
        classify(self.row, self.col, self.total_rows, self.total_cols)
    }
}

/// Classify a cell by position.
///
/// The header band wins over the footer band, so a single-row table is all
/// header. The left side wins over the right side, so a single-column table
/// is all left. Positions outside the grid, such as the extra cells of a
/// ragged row, are clamped onto its edge first; totals of 0 count as 1.
pub fn classify(row: usize, col: usize, total_rows: usize, total_cols: usize) -> BorderClass {
    let total_rows = total_rows.max(1);
    let total_cols = total_cols.max(1);
    let row = row.min(total_rows - 1);
    let col = col.min(total_cols - 1);

    let is_header = row == 0;
    let is_footer = !is_header && row == total_rows - 1;
    let is_first = col == 0;
    let is_last = !is_first && col == total_cols - 1;

    match (is_header, is_footer, is_first, is_last) {
        (true, _, true, _) => BorderClass::HeaderLeft,
        (true, _, _, true) => BorderClass::HeaderRight,
        (true, _, _, _) => BorderClass::HeaderMid,
        (_, true, true, _) => BorderClass::FooterLeft,
        (_, true, _, true) => BorderClass::FooterRight,
        (_, true, _, _) => BorderClass::FooterMid,
        (_, _, true, _) => BorderClass::BodyLeft,
        (_, _, _, true) => BorderClass::BodyRight,
        _ => BorderClass::BodyMid,
    }
}

/// Border/fill ids registered in the template's header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderCatalog {
    /// Fill id of the table frame itself
    pub table: u32,
    pub header_left: u32,
    pub header_mid: u32,
    pub header_right: u32,
    pub body_left: u32,
    pub body_mid: u32,
    pub body_right: u32,
    pub footer_left: u32,
    pub footer_mid: u32,
    pub footer_right: u32,
}

impl BorderCatalog {
    /// `borderFillIDRef` for a class.
    pub fn fill_id(&self, class: BorderClass) -> u32 {
        match class {
            BorderClass::HeaderLeft => self.header_left,
            BorderClass::HeaderMid => self.header_mid,
            BorderClass::HeaderRight => self.header_right,
            BorderClass::BodyLeft => self.body_left,
            BorderClass::BodyMid => self.body_mid,
            BorderClass::BodyRight => self.body_right,
            BorderClass::FooterLeft => self.footer_left,
            BorderClass::FooterMid => self.footer_mid,
            BorderClass::FooterRight => self.footer_right,
        }
    }

    /// `borderFillIDRef` for a cell position.
    pub fn fill_for(&self, position: TableCellPosition) -> u32 {
        self.fill_id(position.classify())
    }
}

impl Default for BorderCatalog {
    fn default() -> Self {
        Self {
            table: 3,
            header_left: 19,
            header_mid: 12,
            header_right: 17,
            body_left: 9,
            body_mid: 7,
            body_right: 8,
            footer_left: 16,
            footer_mid: 10,
            footer_right: 15,
        }
    }
}
