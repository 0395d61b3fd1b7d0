//! Markdown parsing into the block model.

mod caption;
mod cleanup;
mod markdown;
mod numbering;
mod options;
mod table;

pub use caption::{figure_id, roman_to_arabic, CaptionMatcher};
pub use cleanup::MarkdownCleaner;
pub use markdown::{arrange_captions, BlockParser, ParsedMarkdown};
pub use numbering::HeadingNumbering;
pub use options::{ErrorMode, ParseOptions};
pub use table::{parse_table, split_row};
