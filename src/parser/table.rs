//! Pipe table recognition.

use crate::model::TableBlock;

/// Minimum lines for a table: header, separator, one data row.
pub const MIN_TABLE_LINES: usize = 3;

/// Check whether a line belongs to a pipe table.
pub fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Split one table line into trimmed cells.
///
/// One leading and one trailing pipe are dropped before splitting, so
/// `| a | b |` and `| a | b` both give `["a", "b"]`.
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|')
        .map(|cell| cell.trim().replace("**", ""))
        .collect()
}

/// Build a table from a run of table lines.
///
/// The second line is the header separator and is skipped without being
/// validated. Rows keep whatever number of cells they were written with.
/// Returns `None` for runs shorter than [`MIN_TABLE_LINES`].
pub fn parse_table(lines: &[&str]) -> Option<TableBlock> {
    if lines.len() < MIN_TABLE_LINES {
        return None;
    }

    let headers = split_row(lines[0]);
    let rows = lines[2..].iter().map(|line| split_row(line)).collect();
    Some(TableBlock::new(headers, rows))
}
