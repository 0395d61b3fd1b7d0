//! Per-section serialization statistics.

use crate::model::Block;
use serde::{Deserialize, Serialize};

/// Counts collected while a section is serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    /// Section label
    pub label: String,

    /// Paragraphs written, headings and list items excluded
    pub paragraph_count: u32,

    /// Tables written
    pub table_count: u32,

    /// Headings written
    pub heading_count: u32,

    /// List items written
    pub list_item_count: u32,

    /// Pictures written
    pub image_count: u32,

    /// Table and figure captions written
    pub caption_count: u32,

    /// Image references written as placeholders
    pub placeholder_count: u32,
}

impl SectionStats {
    /// Create empty statistics for a section.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Increment paragraph count.
    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    /// Increment table count.
    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Increment heading count.
    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    /// Increment list item count.
    pub fn add_list_item(&mut self) {
        self.list_item_count += 1;
    }

    /// Increment image count.
    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    /// Increment caption count.
    pub fn add_caption(&mut self) {
        self.caption_count += 1;
    }

    /// Increment placeholder count.
    pub fn add_placeholder(&mut self) {
        self.placeholder_count += 1;
    }

    /// Count a text block by kind. Tables and images are counted by the
    /// writer once it knows how they were written.
    pub fn count_block(&mut self, block: &Block) {
        match block {
            Block::Heading { .. } => self.add_heading(),
            Block::BodyParagraph { .. } => self.add_paragraph(),
            Block::ListItem { .. } => self.add_list_item(),
            Block::Caption { .. } => self.add_caption(),
            Block::Table(_) | Block::ImageRef { .. } | Block::Empty => {}
        }
    }

    /// Merge another section's counts into this one.
    pub fn merge(&mut self, other: &SectionStats) {
        self.paragraph_count += other.paragraph_count;
        self.table_count += other.table_count;
        self.heading_count += other.heading_count;
        self.list_item_count += other.list_item_count;
        self.image_count += other.image_count;
        self.caption_count += other.caption_count;
        self.placeholder_count += other.placeholder_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaptionKind, ListKind};

    #[test]
    fn test_count_block() {
        let mut stats = SectionStats::new("1장");
        stats.count_block(&Block::heading(1, "서론"));
        stats.count_block(&Block::paragraph("본문"));
        stats.count_block(&Block::list_item("항목", ListKind::Hanging));
        stats.count_block(&Block::caption("[표Ⅰ-1] 현황", CaptionKind::Table));
        stats.count_block(&Block::Empty);

        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.list_item_count, 1);
        assert_eq!(stats.caption_count, 1);
        assert_eq!(stats.table_count, 0);
    }

    #[test]
    fn test_merge() {
        let mut total = SectionStats::new("total");
        total.paragraph_count = 5;
        total.table_count = 2;

        let other = SectionStats {
            label: "2장".into(),
            paragraph_count: 3,
            table_count: 1,
            placeholder_count: 1,
            ..Default::default()
        };
        total.merge(&other);

        assert_eq!(total.label, "total");
        assert_eq!(total.paragraph_count, 8);
        assert_eq!(total.table_count, 3);
        assert_eq!(total.placeholder_count, 1);
    }
}
