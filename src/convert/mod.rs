//! End-to-end conversion: Markdown sections and a template in, an HWPX
//! package out.
//!
//! # Example
//!
//! ```no_run
//! use mdhwpx::convert::{ConversionJob, ConvertOptions, Converter};
//!
//! fn main() -> mdhwpx::Result<()> {
//!     let job = ConversionJob::new("template.hwpx")
//!         .with_section("Ⅰ. 서론", "sections/01_intro.md")
//!         .with_appendix("부록", "sections/99_appendix.md")
//!         .with_output("report.hwpx");
//!
//!     let summary = Converter::new(ConvertOptions::default()).run(&job)?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

mod job;
mod summary;

pub use job::{default_output_name, ConversionJob, SectionSource};
pub use summary::ConversionSummary;

use crate::diagram::{
    render_all, CommandRenderer, DiagramRenderer, DiagramTask, DirectoryRenderer, RenderBatch,
    DEFAULT_WORKERS,
};
use crate::error::{Error, Result};
use crate::model::{Document, Section, SectionKind};
use crate::package::{AssembleOptions, AssemblyStage, PackageAssembler};
use crate::parser::{BlockParser, ErrorMode, ParseOptions};
use crate::style::StyleCatalog;
use chrono::Local;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How diagrams are turned into images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererKind {
    /// Run an external program (`mmdc` compatible)
    Command(PathBuf),

    /// Copy pre-rendered `diagram_{id}.png` files from a directory
    Directory(PathBuf),

    /// Render nothing; every diagram becomes a placeholder
    Disabled,
}

impl Default for RendererKind {
    fn default() -> Self {
        RendererKind::Command(PathBuf::from("mmdc"))
    }
}

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Markdown parsing
    pub parse: ParseOptions,

    /// Package layout and member names
    pub assemble: AssembleOptions,

    /// Style ids of the template
    pub styles: StyleCatalog,

    /// Diagram renderer
    pub renderer: RendererKind,

    /// Render worker threads
    pub workers: usize,

    /// Wall-clock bound per render
    pub timeout: Option<Duration>,

    /// Where rendered images go; a temporary directory when unset
    pub work_dir: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            assemble: AssembleOptions::default(),
            styles: StyleCatalog::default(),
            renderer: RendererKind::default(),
            workers: DEFAULT_WORKERS,
            timeout: None,
            work_dir: None,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set assembly options.
    pub fn with_assemble_options(mut self, options: AssembleOptions) -> Self {
        self.assemble = options;
        self
    }

    /// Skip missing sections instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse = self.parse.lenient();
        self
    }

    /// Set the style catalog.
    pub fn with_styles(mut self, styles: StyleCatalog) -> Self {
        self.styles = styles;
        self
    }

    /// Set the diagram renderer.
    pub fn with_renderer(mut self, renderer: RendererKind) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the number of render workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Bound each render call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Keep rendered images in `dir`.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }
}

/// Progress events of a conversion run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// All sections parsed
    Parsed {
        /// Blocks across all sections
        blocks: usize,
        /// Diagrams to render
        diagrams: usize,
    },

    /// All render tasks joined
    Rendered {
        /// Diagrams rendered
        ok: usize,
        /// Diagrams that failed
        failed: usize,
    },

    /// An assembly step finished
    Stage(AssemblyStage),
}

impl Progress {
    /// Number of events a run emits.
    pub const COUNT: usize = 2 + AssemblyStage::ALL.len();
}

/// A parsed document plus what parsing left out.
#[derive(Debug, Clone, Default)]
pub struct ParsedSections {
    /// The document
    pub document: Document,

    /// Labels of sections skipped in lenient mode
    pub skipped: Vec<String>,

    /// Diagram fences dropped
    pub dropped_diagrams: usize,
}

/// Runs the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `job` into an HWPX package.
    pub fn run(&self, job: &ConversionJob) -> Result<ConversionSummary> {
        self.run_with(job, &mut |_| {})
    }

    /// Like [`run`](Self::run), calling `on_progress` after each step.
    pub fn run_with(
        &self,
        job: &ConversionJob,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<ConversionSummary> {
        job.validate()?;
        if !job.template.is_file() {
            return Err(Error::MissingInput(format!(
                "template {}",
                job.template.display()
            )));
        }
        let styles = match &job.styles {
            Some(path) => StyleCatalog::from_json_file(path)?,
            None => self.options.styles.clone(),
        };

        let parsed = self.parse(job)?;
        let doc = &parsed.document;
        on_progress(Progress::Parsed {
            blocks: doc.block_count(),
            diagrams: doc.diagrams.len(),
        });

        let scratch;
        let work_dir = match &self.options.work_dir {
            Some(dir) => dir.clone(),
            None => {
                scratch = tempfile::tempdir()?;
                scratch.path().to_path_buf()
            }
        };
        let batch = self.render_diagrams(doc, &work_dir)?;
        on_progress(Progress::Rendered {
            ok: batch.rendered.len(),
            failed: batch.failures.len(),
        });

        let mut assemble = self.options.assemble.clone();
        if let Some(member) = &job.toc_member {
            assemble = assemble.with_toc_member(member.clone());
        }
        let output = job.output_or_default(&Local::now());
        let assembler = PackageAssembler::new(assemble).with_styles(styles);
        let report = assembler.assemble_with(
            &job.template,
            doc,
            &batch.rendered,
            &output,
            &mut |stage| on_progress(Progress::Stage(stage)),
        )?;

        let mut summary = ConversionSummary::from_report(&job.template, report);
        summary.failures = batch.failures;
        summary.dropped_diagrams = parsed.dropped_diagrams;
        summary.skipped_sections = parsed.skipped;

        log::debug!(
            "converted {} sections into {} ({} images, {} placeholders)",
            summary.sections.len(),
            summary.output.display(),
            summary.asset_count,
            summary.placeholders.len()
        );
        Ok(summary)
    }

    /// Read and parse every section of `job`.
    ///
    /// Appendix sections keep their heading numbers. A diagram whose figure
    /// id already appeared in an earlier section is dropped.
    pub fn parse(&self, job: &ConversionJob) -> Result<ParsedSections> {
        let body_parser = BlockParser::new(self.options.parse.clone())?;
        let appendix_parser = BlockParser::new(self.options.parse.clone().keep_heading_numbers())?;

        let mut parsed = ParsedSections::default();
        let mut figures = HashSet::new();
        let sources = job
            .body
            .iter()
            .map(|s| (s, SectionKind::Body, &body_parser))
            .chain(
                job.appendix
                    .iter()
                    .map(|s| (s, SectionKind::Appendix, &appendix_parser)),
            );

        for (source, kind, parser) in sources {
            let Some(text) = self.read_section(source)? else {
                parsed.skipped.push(source.label.clone());
                continue;
            };

            let mut markdown = parser.parse_document(&text);
            parsed.dropped_diagrams += markdown.dropped_diagrams;
            let mut reused = HashSet::new();
            for diagram in markdown.diagrams {
                if figures.insert(diagram.figure_id.clone()) {
                    parsed.document.diagrams.push(diagram);
                } else {
                    log::warn!(
                        "section {}: figure {} already used; diagram dropped",
                        source.label,
                        diagram.figure_id
                    );
                    parsed.dropped_diagrams += 1;
                    reused.insert(diagram.figure_id);
                }
            }
            // a dropped diagram leaves no picture behind
            if !reused.is_empty() {
                markdown
                    .blocks
                    .retain(|b| b.figure_id().map_or(true, |id| !reused.contains(id)));
            }
            parsed.document.captions.merge(markdown.captions);
            parsed.document.add_section(
                Section::new(source.label.clone(), kind, markdown.blocks)
                    .with_outline(markdown.outline),
            );
        }

        if parsed.document.sections.is_empty() {
            return Err(Error::MissingInput("no readable sections".to_string()));
        }
        Ok(parsed)
    }

    /// Render every diagram of `doc` into `work_dir`.
    pub fn render_diagrams(&self, doc: &Document, work_dir: &Path) -> Result<RenderBatch> {
        let tasks = DiagramTask::from_sources(&doc.diagrams, &doc.captions);
        let renderer: Box<dyn DiagramRenderer> = match &self.options.renderer {
            RendererKind::Command(program) => {
                let mut renderer = CommandRenderer::new(program.clone());
                if let Some(timeout) = self.options.timeout {
                    renderer = renderer.with_timeout(timeout);
                }
                Box::new(renderer)
            }
            RendererKind::Directory(dir) => Box::new(DirectoryRenderer::new(dir.clone())),
            RendererKind::Disabled => {
                if !tasks.is_empty() {
                    log::warn!("diagram rendering disabled; {} placeholders", tasks.len());
                }
                return Ok(RenderBatch::default());
            }
        };
        render_all(&tasks, renderer.as_ref(), work_dir, self.options.workers)
    }

    /// Read a section, or `None` if it is missing and the mode is lenient.
    fn read_section(&self, source: &SectionSource) -> Result<Option<String>> {
        match fs::read_to_string(&source.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match self.options.parse.error_mode {
                    ErrorMode::Strict => Err(Error::MissingInput(format!(
                        "section {} ({})",
                        source.label,
                        source.path.display()
                    ))),
                    ErrorMode::Lenient => {
                        log::warn!(
                            "section {} not found at {}; skipped",
                            source.label,
                            source.path.display()
                        );
                        Ok(None)
                    }
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
