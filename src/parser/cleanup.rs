//! Text cleanup applied before and during tokenizing.

use crate::error::Result;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Removes non-content syntax from Markdown source.
pub struct MarkdownCleaner {
    normalize_unicode: bool,
    front_matter: Regex,
    comment: Regex,
    wiki_link: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
}

impl MarkdownCleaner {
    /// Create a new cleaner.
    pub fn new(normalize_unicode: bool) -> Result<Self> {
        Ok(Self {
            normalize_unicode,
            front_matter: Regex::new(r"(?s)\A---\n.*?\n---\n")?,
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            wiki_link: Regex::new(r"\[\[[^\]\n]*\]\]")?,
            bold: Regex::new(r"\*\*(.+?)\*\*")?,
            italic: Regex::new(r"\*(.+?)\*")?,
            code: Regex::new(r"`(.+?)`")?,
        })
    }

    /// Strip front matter, comments and wiki links.
    pub fn clean(&self, text: &str) -> String {
        let mut result = text.replace("\r\n", "\n");

        if self.normalize_unicode {
            result = result.nfc().collect();
        }

        result = self.front_matter.replace(&result, "").into_owned();
        result = self.comment.replace_all(&result, "").into_owned();
        result = self.wiki_link.replace_all(&result, "").into_owned();

        result.trim().to_string()
    }

    /// Remove bold markers from inline text.
    pub fn strip_bold(&self, text: &str) -> String {
        text.replace("**", "")
    }

    /// Remove bold, italic and code spans, keeping their content.
    pub fn strip_inline(&self, text: &str) -> String {
        let text = self.bold.replace_all(text, "$1");
        let text = self.italic.replace_all(&text, "$1");
        let text = self.code.replace_all(&text, "$1");
        text.trim().to_string()
    }
}
