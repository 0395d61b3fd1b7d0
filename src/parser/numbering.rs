//! Removal of manual heading numbers.
//!
//! The target word processor numbers headings itself, so a prefix such as
//! `Ⅱ.` or `3.1.` written by hand would be printed twice. Each heading level
//! has its own numbering scheme; only the scheme of the heading's level is
//! removed.

use crate::error::Result;
use regex::Regex;

const ROMAN: &str = "IVXⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩⅪⅫ";

/// Per-level numbering prefixes.
pub struct HeadingNumbering {
    levels: [Regex; 5],
}

impl HeadingNumbering {
    /// Compile the level patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            levels: [
                // Ⅰ. / IV.
                Regex::new(&format!(r"^[{}]+\.\s*", ROMAN))?,
                // 1. / 1.2.
                Regex::new(r"^\d+(?:\.\d+)*\.\s*")?,
                // 가.
                Regex::new(r"^[가-힣]\.\s*")?,
                // 1) / 1.2)
                Regex::new(r"^\d+(?:\.\d+)*[.)]\s*")?,
                // 가)
                Regex::new(r"^[가-힣][.)]\s*")?,
            ],
        })
    }

    /// Remove the numbering prefix of `level` from `text`.
    ///
    /// Prefixes are removed until none is left, so the result is a fixed
    /// point: stripping it again changes nothing. Levels outside 1-5 are
    /// returned unchanged.
    pub fn strip(&self, level: u8, text: &str) -> String {
        let Some(pattern) = level
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
        else {
            return text.trim().to_string();
        };

        let mut current = text.trim();
        while let Some(m) = pattern.find(current) {
            if m.is_empty() {
                break;
            }
            current = current[m.end()..].trim_start();
        }
        current.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_per_level() {
        let n = HeadingNumbering::new().unwrap();
        assert_eq!(n.strip(1, "Ⅱ. 이론적 배경"), "이론적 배경");
        assert_eq!(n.strip(1, "IV. Results"), "Results");
        assert_eq!(n.strip(2, "2.1. 연구 대상"), "연구 대상");
        assert_eq!(n.strip(3, "가. 표본"), "표본");
        assert_eq!(n.strip(4, "1) 첫째"), "첫째");
        assert_eq!(n.strip(4, "1.2.3. 세부"), "세부");
        assert_eq!(n.strip(5, "나) 둘째"), "둘째");
    }

    #[test]
    fn test_other_level_scheme_kept() {
        let n = HeadingNumbering::new().unwrap();
        assert_eq!(n.strip(2, "가. 표본"), "가. 표본");
        assert_eq!(n.strip(3, "1. 개요"), "1. 개요");
        assert_eq!(n.strip(6, "1. 개요"), "1. 개요");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let n = HeadingNumbering::new().unwrap();
        let cases = [
            (1, "Ⅲ. 연구 방법"),
            (2, "1. 2. 중복 번호"),
            (3, "가. 나. 항목"),
            (4, "3) 결과"),
            (5, "다) 논의"),
            (2, "번호 없음"),
        ];
        for (level, text) in cases {
            let once = n.strip(level, text);
            assert_eq!(n.strip(level, &once), once, "level {} {:?}", level, text);
        }
    }
}
