//! End-of-run summary.

use crate::diagram::RenderFailure;
use crate::package::AssemblyReport;
use crate::render::SectionStats;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What a conversion produced and what it had to leave out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Template package read
    pub template: PathBuf,

    /// Output package written
    pub output: PathBuf,

    /// When the run finished
    pub generated_at: DateTime<Local>,

    /// Statistics per section, in output order
    pub sections: Vec<SectionStats>,

    /// Images registered in the package
    pub asset_count: usize,

    /// Diagrams that failed to render
    pub failures: Vec<RenderFailure>,

    /// Figure ids written as placeholders
    pub placeholders: Vec<String>,

    /// Diagram fences dropped for lack of a caption
    pub dropped_diagrams: usize,

    /// Sections skipped in lenient mode
    pub skipped_sections: Vec<String>,

    /// Entries in the table of contents
    pub toc_entries: usize,

    /// Files in the output archive
    pub archive_files: u64,
}

impl ConversionSummary {
    /// Build a summary from an assembly report.
    pub fn from_report(template: impl Into<PathBuf>, report: AssemblyReport) -> Self {
        Self {
            template: template.into(),
            output: report.output,
            generated_at: Local::now(),
            sections: report.sections,
            asset_count: report.assets.len(),
            failures: Vec::new(),
            placeholders: report.placeholders,
            dropped_diagrams: 0,
            skipped_sections: Vec::new(),
            toc_entries: report.toc_entries,
            archive_files: report.archive_files,
        }
    }

    /// Counts over all sections.
    pub fn totals(&self) -> SectionStats {
        let mut total = SectionStats::new("total");
        for section in &self.sections {
            total.merge(section);
        }
        total
    }

    /// Check if every diagram made it into the package.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.placeholders.is_empty() && self.dropped_diagrams == 0
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Output:    {}", self.output.display())?;
        writeln!(f, "Template:  {}", self.template.display())?;
        writeln!(
            f,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<24} {:>6} {:>6} {:>6} {:>6} {:>6}",
            "Section", "para", "table", "head", "list", "image"
        )?;
        for s in self.sections.iter().chain(std::iter::once(&self.totals())) {
            writeln!(
                f,
                "{:<24} {:>6} {:>6} {:>6} {:>6} {:>6}",
                truncate(&s.label, 24),
                s.paragraph_count,
                s.table_count,
                s.heading_count,
                s.list_item_count,
                s.image_count
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Images:    {}", self.asset_count)?;
        if self.toc_entries > 0 {
            writeln!(f, "TOC:       {} entries", self.toc_entries)?;
        }
        if !self.skipped_sections.is_empty() {
            writeln!(f, "Skipped:   {}", self.skipped_sections.join(", "))?;
        }
        if self.dropped_diagrams > 0 {
            writeln!(f, "Dropped:   {} diagrams without a unique caption", self.dropped_diagrams)?;
        }
        if !self.placeholders.is_empty() {
            writeln!(f, "Missing:   {}", self.placeholders.join(", "))?;
        }
        for failure in &self.failures {
            writeln!(f, "Failed:    {} ({})", failure.figure_id, failure.error)?;
        }
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
