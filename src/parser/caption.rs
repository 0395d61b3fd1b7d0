//! Caption markers such as `[그림Ⅱ-3]` and `[표Ⅰ-1]`.

use crate::error::Result;
use crate::model::{CaptionCatalog, CaptionKind};
use regex::Regex;

const ROMAN_NUMERALS: &str = "ⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩⅪⅫ";

/// Matches caption markers and caption lines for one pair of labels.
pub struct CaptionMatcher {
    figure_marker: Regex,
    figure_line: Regex,
    table_line: Regex,
}

impl CaptionMatcher {
    /// Build matchers for the given figure and table labels.
    pub fn new(figure_label: &str, table_label: &str) -> Result<Self> {
        let figure = regex::escape(figure_label);
        let table = regex::escape(table_label);
        Ok(Self {
            figure_marker: Regex::new(&format!(r"\[{}([{}]+)-(\d+)\]", figure, ROMAN_NUMERALS))?,
            figure_line: Regex::new(&line_pattern(&figure))?,
            table_line: Regex::new(&line_pattern(&table))?,
        })
    }

    /// Which caption a line is, if any.
    pub fn caption_kind(&self, line: &str) -> Option<CaptionKind> {
        if self.table_line.is_match(line) {
            Some(CaptionKind::Table)
        } else if self.figure_line.is_match(line) {
            Some(CaptionKind::Figure)
        } else {
            None
        }
    }

    /// Figure id of the last figure marker in `text[..offset]` that lies
    /// within `lookback` characters of `offset`.
    pub fn figure_before(&self, text: &str, offset: usize, lookback: usize) -> Option<String> {
        if lookback == 0 {
            return None;
        }
        let head = text.get(..offset)?;
        let start = head
            .char_indices()
            .rev()
            .nth(lookback - 1)
            .map(|(i, _)| i)
            .unwrap_or(0);

        let caps = self.figure_marker.captures_iter(&head[start..]).last()?;
        figure_id(&caps[1], &caps[2])
    }

    /// Collect caption titles from every caption line in `text`.
    pub fn scan(&self, text: &str) -> CaptionCatalog {
        let mut catalog = CaptionCatalog::new();
        for line in text.lines() {
            let line = line.trim();
            let target = match self.caption_kind(line) {
                Some(CaptionKind::Table) => &mut catalog.tables,
                Some(CaptionKind::Figure) => &mut catalog.figures,
                None => continue,
            };
            if let Some((id, title)) = split_caption(line) {
                target.entry(id).or_insert(title);
            }
        }
        catalog
    }
}

fn line_pattern(label: &str) -> String {
    format!(r"^(?:\*\*)?\[{}[{}]+-\d+\]", label, ROMAN_NUMERALS)
}

/// Split `[표Ⅱ-3] 제목` into ("2-3", "제목").
fn split_caption(line: &str) -> Option<(String, String)> {
    let line = line.trim_start_matches("**");
    let close = line.find(']')?;
    let marker = &line[1..close];
    let dash = marker.rfind('-')?;
    let (head, number) = (&marker[..dash], &marker[dash + 1..]);
    let roman_start = head.find(|c: char| ROMAN_NUMERALS.contains(c))?;
    let id = figure_id(&head[roman_start..], number)?;

    let title = line[close + 1..].trim().trim_end_matches("**").trim();
    Some((id, title.to_string()))
}

/// Build a figure id such as "1-2" from a roman chapter and a number.
pub fn figure_id(roman: &str, number: &str) -> Option<String> {
    let chapter = roman_to_arabic(roman)?;
    let number: u32 = number.parse().ok()?;
    Some(format!("{}-{}", chapter, number))
}

/// Convert Unicode roman numerals (Ⅰ..Ⅻ) to an integer.
pub fn roman_to_arabic(roman: &str) -> Option<u32> {
    let values: Vec<u32> = roman
        .chars()
        .map(|c| {
            ROMAN_NUMERALS
                .chars()
                .position(|r| r == c)
                .map(|p| p as u32 + 1)
        })
        .collect::<Option<_>>()?;
    if values.is_empty() {
        return None;
    }

    let mut total = 0i64;
    for (i, &v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if next > v => total -= v as i64,
            _ => total += v as i64,
        }
    }
    u32::try_from(total).ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> CaptionMatcher {
        CaptionMatcher::new("그림", "표").unwrap()
    }

    #[test]
    fn test_roman_to_arabic() {
        assert_eq!(roman_to_arabic("Ⅰ"), Some(1));
        assert_eq!(roman_to_arabic("Ⅷ"), Some(8));
        assert_eq!(roman_to_arabic("Ⅻ"), Some(12));
        assert_eq!(roman_to_arabic("ⅩⅠ"), Some(11));
        assert_eq!(roman_to_arabic("ⅠⅩ"), Some(9));
        assert_eq!(roman_to_arabic(""), None);
        assert_eq!(roman_to_arabic("I"), None);
    }

    #[test]
    fn test_caption_kind() {
        let m = matcher();
        assert_eq!(m.caption_kind("[표Ⅰ-1] 표본 구성"), Some(CaptionKind::Table));
        assert_eq!(m.caption_kind("**[그림Ⅲ-2] 모형**"), Some(CaptionKind::Figure));
        assert_eq!(m.caption_kind("본문 [그림Ⅲ-2] 참조"), None);
        assert_eq!(m.caption_kind("[표1-1] 아라비아"), None);
    }

    #[test]
    fn test_figure_before_picks_nearest() {
        let m = matcher();
        let text = "[그림Ⅰ-1] 앞\n설명\n[그림Ⅱ-4] 뒤\n```mermaid";
        let offset = text.find("```").unwrap();
        assert_eq!(m.figure_before(text, offset, 500), Some("2-4".to_string()));
    }

    #[test]
    fn test_figure_before_respects_window() {
        let m = matcher();
        let filler = "가".repeat(600);
        let text = format!("[그림Ⅰ-1] 제목\n{}\n", filler);
        let offset = text.len();
        assert_eq!(m.figure_before(&text, offset, 500), None);
        assert_eq!(m.figure_before(&text, offset, 700), Some("1-1".to_string()));
        assert_eq!(m.figure_before(&text, offset, 0), None);
    }

    #[test]
    fn test_scan_catalog() {
        let m = matcher();
        let text = "[표Ⅰ-1] 표본 구성\n본문\n**[그림Ⅱ-3] 연구 모형**\n[표Ⅰ-1] 중복";
        let catalog = m.scan(text);
        assert_eq!(catalog.table_title("1-1"), Some("표본 구성"));
        assert_eq!(catalog.figure_title("2-3"), Some("연구 모형"));
        assert_eq!(catalog.tables.len(), 1);
    }
}
