//! Markdown to block tokenizer.

use super::caption::CaptionMatcher;
use super::cleanup::MarkdownCleaner;
use super::numbering::HeadingNumbering;
use super::options::ParseOptions;
use super::table::{is_table_line, parse_table};
use crate::error::Result;
use crate::model::{
    Block, CaptionCatalog, CaptionKind, DiagramSource, ListKind, Outline, OutlineItem,
};
use regex::Regex;
use std::collections::HashSet;

/// Everything collected from one Markdown source.
#[derive(Debug, Clone, Default)]
pub struct ParsedMarkdown {
    /// Blocks in document order
    pub blocks: Vec<Block>,

    /// Diagram sources, one per `ImageRef`
    pub diagrams: Vec<DiagramSource>,

    /// Headings as written
    pub outline: Outline,

    /// Caption titles
    pub captions: CaptionCatalog,

    /// Diagram fences dropped for lack of a unique caption
    pub dropped_diagrams: usize,
}

/// A line-level unit after fenced blocks have been folded.
enum Segment<'a> {
    Line(&'a str),
    Diagram(String),
    Code,
}

/// Tokenizes Markdown report text into [`Block`]s.
pub struct BlockParser {
    options: ParseOptions,
    cleaner: MarkdownCleaner,
    numbering: HeadingNumbering,
    captions: CaptionMatcher,
    numbered_item: Regex,
}

impl BlockParser {
    /// Create a new parser. Fails only if the configured labels produce an
    /// invalid pattern.
    pub fn new(options: ParseOptions) -> Result<Self> {
        Ok(Self {
            cleaner: MarkdownCleaner::new(options.normalize_unicode)?,
            numbering: HeadingNumbering::new()?,
            captions: CaptionMatcher::new(&options.figure_label, &options.table_label)?,
            numbered_item: Regex::new(r"^\d+\.\s+")?,
            options,
        })
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse text into an ordered block sequence.
    pub fn parse(&self, text: &str) -> Vec<Block> {
        self.parse_document(text).blocks
    }

    /// Parse text, keeping diagrams, outline and captions as well.
    pub fn parse_document(&self, text: &str) -> ParsedMarkdown {
        let cleaned = self.cleaner.clean(text);
        let mut parsed = ParsedMarkdown {
            captions: self.captions.scan(&cleaned),
            ..Default::default()
        };

        let segments = self.fold_fences(&cleaned, &mut parsed);
        self.tokenize(&segments, &mut parsed);

        if self.options.arrange_captions {
            parsed.blocks = arrange_captions(std::mem::take(&mut parsed.blocks));
        }

        log::debug!(
            "parsed {} blocks, {} diagrams ({} dropped)",
            parsed.blocks.len(),
            parsed.diagrams.len(),
            parsed.dropped_diagrams
        );
        parsed
    }

    /// Replace fenced blocks with single segments.
    fn fold_fences<'a>(&self, text: &'a str, parsed: &mut ParsedMarkdown) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut lines = line_offsets(text);

        while let Some((offset, line)) = lines.next() {
            let Some(language) = fence_language(line) else {
                segments.push(Segment::Line(line));
                continue;
            };

            let mut body = Vec::new();
            for (_, inner) in lines.by_ref() {
                if fence_language(inner).is_some() {
                    break;
                }
                body.push(inner);
            }

            if !language.eq_ignore_ascii_case(&self.options.diagram_language) {
                segments.push(Segment::Code);
                continue;
            }

            let lookback = self.options.caption_lookback;
            match self.captions.figure_before(text, offset, lookback) {
                Some(figure_id) if seen.insert(figure_id.clone()) => {
                    parsed
                        .diagrams
                        .push(DiagramSource::new(figure_id.clone(), body.join("\n")));
                    segments.push(Segment::Diagram(figure_id));
                }
                Some(figure_id) => {
                    log::warn!(
                        "diagram at byte {} reuses figure {}; dropped",
                        offset,
                        figure_id
                    );
                    parsed.dropped_diagrams += 1;
                }
                None => {
                    log::warn!(
                        "diagram at byte {} has no caption within {} characters; dropped",
                        offset,
                        lookback
                    );
                    parsed.dropped_diagrams += 1;
                }
            }
        }

        segments
    }

    fn tokenize(&self, segments: &[Segment<'_>], parsed: &mut ParsedMarkdown) {
        let mut i = 0;
        while i < segments.len() {
            let line = match &segments[i] {
                Segment::Diagram(figure_id) => {
                    parsed.blocks.push(Block::image(figure_id.clone()));
                    i += 1;
                    continue;
                }
                Segment::Code => {
                    parsed.blocks.push(Block::Empty);
                    i += 1;
                    continue;
                }
                Segment::Line(line) => line.trim_end(),
            };

            if is_table_line(line) {
                let run: Vec<&str> = segments[i..]
                    .iter()
                    .map_while(|s| match s {
                        Segment::Line(l) if is_table_line(l) => Some(*l),
                        _ => None,
                    })
                    .collect();
                if let Some(table) = parse_table(&run) {
                    parsed.blocks.push(Block::Table(table));
                    i += run.len();
                    continue;
                }
            }

            let block = self.classify_line(line, &mut parsed.outline);
            parsed.blocks.push(block);
            i += 1;
        }
    }

    /// Classify a single non-table line.
    fn classify_line(&self, line: &str, outline: &mut Outline) -> Block {
        if line.trim().is_empty() {
            return Block::Empty;
        }

        if let Some((level, rest)) = heading_marker(line) {
            let text = self.cleaner.strip_inline(rest);
            outline.add_item(OutlineItem::new(text.clone(), level));
            let text = if self.options.strip_heading_numbers {
                self.numbering.strip(level, &text)
            } else {
                text
            };
            return Block::heading(level, text);
        }

        if let Some(rest) = line.strip_prefix("- ") {
            let text = self.cleaner.strip_bold(rest.trim());
            let kind = if self.is_hanging(&text) {
                ListKind::Hanging
            } else {
                ListKind::Bullet
            };
            return Block::list_item(text, kind);
        }

        if let Some(m) = self.numbered_item.find(line) {
            let text = self.cleaner.strip_bold(line[m.end()..].trim());
            return Block::list_item(text, ListKind::Numbered);
        }

        if let Some(kind) = self.captions.caption_kind(line) {
            let text = line.trim().trim_start_matches("**").trim_end_matches("**");
            return Block::caption(text, kind);
        }

        Block::paragraph(self.cleaner.strip_bold(line))
    }

    fn is_hanging(&self, text: &str) -> bool {
        text.chars().count() > self.options.hanging_min_length
            || text
                .chars()
                .take(self.options.hanging_colon_window)
                .any(|c| c == ':')
    }
}

/// Heading level and remaining text for `#`..`#####` lines.
fn heading_marker(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if !(1..=5).contains(&hashes) {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest.trim()))
}

/// Language tag of a fence line, or `None` if the line is not a fence.
fn fence_language(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("```")?;
    Some(rest.split_whitespace().next().unwrap_or(""))
}

/// Lines paired with their byte offset.
fn line_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}

/// Put figure captions after their image and drop the blank line between a
/// table caption and its table.
pub fn arrange_captions(blocks: Vec<Block>) -> Vec<Block> {
    let mut arranged = Vec::with_capacity(blocks.len());
    let mut i = 0;

    while i < blocks.len() {
        let block = &blocks[i];
        let next = blocks.get(i + 1);

        if block.is_caption(CaptionKind::Figure) && next.is_some_and(Block::is_image) {
            arranged.push(blocks[i + 1].clone());
            arranged.push(block.clone());
            i += 2;
            continue;
        }

        arranged.push(block.clone());
        if block.is_caption(CaptionKind::Table)
            && next.is_some_and(Block::is_empty)
            && blocks.get(i + 2).is_some_and(Block::is_table)
        {
            i += 2;
        } else {
            i += 1;
        }
    }

    arranged
}
