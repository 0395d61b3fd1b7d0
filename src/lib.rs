//! # mdhwpx
//!
//! Assemble Markdown report sections into an HWPX package built from an
//! existing template.
//!
//! The template's styles, header and page setup are kept as they are; the
//! body of a section member is replaced with paragraphs, tables and pictures
//! generated from Markdown, and rendered diagrams are registered as binary
//! assets in the package manifest.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdhwpx::Mdhwpx;
//!
//! fn main() -> mdhwpx::Result<()> {
//!     let summary = Mdhwpx::new()
//!         .with_section("Ⅰ. 서론", "sections/01_intro.md")
//!         .with_section("Ⅱ. 연구 방법", "sections/02_method.md")
//!         .with_appendix("부록", "sections/99_appendix.md")
//!         .with_toc_member("Contents/section1.xml")
//!         .convert("template.hwpx", "report.hwpx")?;
//!
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`parser`]: Markdown text to [`Block`]s, captions and diagram sources
//! 2. [`diagram`]: diagrams rendered in parallel, failures isolated
//! 3. [`style`]: blocks resolved to template style ids
//! 4. [`render`]: section XML written with `quick-xml`
//! 5. [`package`]: preamble kept, body injected, assets and manifest
//!    updated, archive written with `mimetype` first

pub mod assets;
pub mod convert;
pub mod detect;
pub mod diagram;
pub mod error;
pub mod model;
pub mod package;
pub mod parser;
pub mod render;
pub mod style;

// Re-export commonly used types
pub use assets::{scale_to_fit, ImageAssetManager};
pub use convert::{
    ConversionJob, ConversionSummary, ConvertOptions, Converter, Progress, RendererKind,
    SectionSource,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_hwpx, HwpxFormat};
pub use error::{Error, Result};
pub use model::{
    Block, CaptionKind, Document, ImageAsset, ListKind, MediaType, Outline, Section, SectionKind,
    TableBlock,
};
pub use package::{AssembleOptions, AssemblyReport, AssemblyStage, PackageAssembler};
pub use parser::{BlockParser, ErrorMode, ParseOptions, ParsedMarkdown};
pub use render::LayoutOptions;
pub use style::{classify, BorderClass, StyleCatalog, StyleKey, StyleResolver, StyleTriple};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parse Markdown text into blocks with default options.
///
/// # Example
///
/// ```
/// use mdhwpx::{parse_markdown, Block};
///
/// let blocks = parse_markdown("# Ⅰ. 서론\n\n본문").unwrap();
/// assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
/// ```
pub fn parse_markdown(text: &str) -> Result<Vec<Block>> {
    parse_markdown_with_options(text, ParseOptions::default())
}

/// Parse Markdown text into blocks with custom options.
pub fn parse_markdown_with_options(text: &str, options: ParseOptions) -> Result<Vec<Block>> {
    Ok(BlockParser::new(options)?.parse(text))
}

/// Parse a Markdown file, keeping diagrams, outline and captions.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedMarkdown> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::MissingInput(format!("{}: {}", path.display(), e)))?;
    Ok(BlockParser::new(ParseOptions::default())?.parse_document(&text))
}

/// Run a conversion job with default options.
pub fn convert(job: &ConversionJob) -> Result<ConversionSummary> {
    Converter::default().run(job)
}

/// Builder for conversion runs.
///
/// # Example
///
/// ```no_run
/// use mdhwpx::{Mdhwpx, RendererKind};
///
/// let summary = Mdhwpx::new()
///     .lenient()
///     .with_renderer(RendererKind::Directory("./diagrams".into()))
///     .with_section("Ⅰ. 서론", "01.md")
///     .convert("template.hwpx", "report.hwpx")?;
/// # Ok::<(), mdhwpx::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mdhwpx {
    options: ConvertOptions,
    body: Vec<SectionSource>,
    appendix: Vec<SectionSource>,
    toc_member: Option<String>,
}

impl Mdhwpx {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip missing sections instead of failing.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Add a body section.
    pub fn with_section(mut self, label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.body.push(SectionSource::new(label, path));
        self
    }

    /// Add an appendix section.
    pub fn with_appendix(mut self, label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.appendix.push(SectionSource::new(label, path));
        self
    }

    /// Write a table of contents into a section member.
    pub fn with_toc_member(mut self, member: impl Into<String>) -> Self {
        self.toc_member = Some(member.into());
        self
    }

    /// Set the section member receiving the body.
    pub fn with_section_member(mut self, member: impl Into<String>) -> Self {
        self.options.assemble = self.options.assemble.with_section_member(member);
        self
    }

    /// Set the style catalog.
    pub fn with_styles(mut self, styles: StyleCatalog) -> Self {
        self.options = self.options.with_styles(styles);
        self
    }

    /// Set the diagram renderer.
    pub fn with_renderer(mut self, renderer: RendererKind) -> Self {
        self.options = self.options.with_renderer(renderer);
        self
    }

    /// Set the number of render workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options = self.options.with_workers(workers);
        self
    }

    /// Bound each render call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    /// Set the image width budget.
    pub fn with_max_display_width(mut self, width: u32) -> Self {
        self.options.assemble = self.options.assemble.with_max_display_width(width);
        self
    }

    /// Build the job this builder describes.
    pub fn job(&self, template: impl Into<PathBuf>, output: impl Into<PathBuf>) -> ConversionJob {
        ConversionJob {
            template: template.into(),
            body: self.body.clone(),
            appendix: self.appendix.clone(),
            output: Some(output.into()),
            toc_member: self.toc_member.clone(),
            styles: None,
        }
    }

    /// Convert into `output` using `template`.
    pub fn convert(
        self,
        template: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Result<ConversionSummary> {
        let job = self.job(template, output);
        Converter::new(self.options).run(&job)
    }
}
