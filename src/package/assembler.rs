//! Template package assembly.

use super::archive::{repackage, TemplatePackage};
use super::manifest::Manifest;
use super::preamble::SectionPreamble;
use super::validate_xml;
use crate::assets::ImageAssetManager;
use crate::error::Result;
use crate::model::{Document, ImageAsset};
use crate::render::{render_document, render_toc, LayoutOptions, SectionStats};
use crate::style::{StyleCatalog, StyleResolver};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Steps of an assembly run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssemblyStage {
    /// Template members written to the scratch directory
    Extracted,
    /// Section preambles parsed
    HeaderPreserved,
    /// Section bodies serialized and written
    BodyInjected,
    /// Image bytes written to the binary directory
    AssetsRegistered,
    /// Manifest items added
    ManifestUpdated,
    /// Output archive written
    Repackaged,
    /// Scratch state removed
    Done,
}

impl AssemblyStage {
    /// All stages in order.
    pub const ALL: [AssemblyStage; 7] = [
        AssemblyStage::Extracted,
        AssemblyStage::HeaderPreserved,
        AssemblyStage::BodyInjected,
        AssemblyStage::AssetsRegistered,
        AssemblyStage::ManifestUpdated,
        AssemblyStage::Repackaged,
        AssemblyStage::Done,
    ];

    /// Upper-case stage name.
    pub fn name(self) -> &'static str {
        match self {
            AssemblyStage::Extracted => "EXTRACTED",
            AssemblyStage::HeaderPreserved => "HEADER_PRESERVED",
            AssemblyStage::BodyInjected => "BODY_INJECTED",
            AssemblyStage::AssetsRegistered => "ASSETS_REGISTERED",
            AssemblyStage::ManifestUpdated => "MANIFEST_UPDATED",
            AssemblyStage::Repackaged => "REPACKAGED",
            AssemblyStage::Done => "DONE",
        }
    }
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where things live inside the package, and how to lay them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleOptions {
    /// Section member that receives the document body
    pub section_member: String,

    /// Section member that receives the table of contents, if any
    pub toc_member: Option<String>,

    /// Manifest member
    pub manifest_member: String,

    /// Binary-asset directory
    pub bin_dir: String,

    /// Layout constants
    pub layout: LayoutOptions,
}

impl AssembleOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body section member.
    pub fn with_section_member(mut self, member: impl Into<String>) -> Self {
        self.section_member = member.into();
        self
    }

    /// Write a table of contents into `member`.
    pub fn with_toc_member(mut self, member: impl Into<String>) -> Self {
        self.toc_member = Some(member.into());
        self
    }

    /// Set the manifest member.
    pub fn with_manifest_member(mut self, member: impl Into<String>) -> Self {
        self.manifest_member = member.into();
        self
    }

    /// Set the binary-asset directory.
    pub fn with_bin_dir(mut self, dir: impl Into<String>) -> Self {
        self.bin_dir = dir.into();
        self
    }

    /// Set the layout constants.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Set the image width budget.
    pub fn with_max_display_width(mut self, width: u32) -> Self {
        self.layout.max_display_width = width;
        self
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            section_member: "Contents/section2.xml".to_string(),
            toc_member: None,
            manifest_member: "Contents/content.hpf".to_string(),
            bin_dir: "BinData".to_string(),
            layout: LayoutOptions::default(),
        }
    }
}

/// What an assembly run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Output package path
    pub output: PathBuf,

    /// Statistics per section
    pub sections: Vec<SectionStats>,

    /// Registered images, in id order
    pub assets: Vec<ImageAsset>,

    /// Figure ids written as placeholders
    pub placeholders: Vec<String>,

    /// Entries in the table of contents
    pub toc_entries: usize,

    /// Files in the output archive
    pub archive_files: u64,
}

impl AssemblyReport {
    /// Counts over all sections.
    pub fn totals(&self) -> SectionStats {
        let mut total = SectionStats::new("total");
        for section in &self.sections {
            total.merge(section);
        }
        total
    }
}

/// Everything read and checked from the template before any write.
struct Prepared {
    template: TemplatePackage,
    section: SectionPreamble,
    toc: Option<SectionPreamble>,
    manifest: Manifest,
    highest_id: u32,
}

/// Assembles a document into a copy of a template package.
#[derive(Debug, Clone, Default)]
pub struct PackageAssembler {
    options: AssembleOptions,
    resolver: StyleResolver,
}

impl PackageAssembler {
    /// Create an assembler with the default style catalog.
    pub fn new(options: AssembleOptions) -> Self {
        Self {
            options,
            resolver: StyleResolver::default(),
        }
    }

    /// Use a different style catalog.
    pub fn with_styles(mut self, catalog: StyleCatalog) -> Self {
        self.resolver = StyleResolver::new(catalog);
        self
    }

    /// Get the options.
    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Assemble `doc` into a copy of `template` written to `output`.
    ///
    /// `rendered` maps figure ids to rendered images; figures without an
    /// entry become placeholders. Nothing is written to `output` unless
    /// every step succeeds.
    pub fn assemble(
        &self,
        template: &Path,
        doc: &Document,
        rendered: &BTreeMap<String, PathBuf>,
        output: &Path,
    ) -> Result<AssemblyReport> {
        self.assemble_with(template, doc, rendered, output, &mut |_| {})
    }

    /// Like [`assemble`](Self::assemble), calling `on_stage` after each step.
    pub fn assemble_with(
        &self,
        template: &Path,
        doc: &Document,
        rendered: &BTreeMap<String, PathBuf>,
        output: &Path,
        on_stage: &mut dyn FnMut(AssemblyStage),
    ) -> Result<AssemblyReport> {
        let opts = &self.options;
        let layout = &opts.layout;
        let prepared = self.prepare(template)?;

        let mut stage = |s: AssemblyStage| {
            log::debug!("assembly stage {}", s);
            on_stage(s);
        };

        let scratch = tempfile::tempdir()?;
        let root = scratch.path();
        prepared.template.extract_to(root)?;
        stage(AssemblyStage::Extracted);
        stage(AssemblyStage::HeaderPreserved);

        // ids come from the template, bytes are written after the body
        let mut manager = ImageAssetManager::after(prepared.highest_id)
            .with_max_display_width(layout.max_display_width);
        let mut assets = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for figure_id in doc.figure_ids() {
            if !seen.insert(figure_id) {
                continue;
            }
            if let Some(path) = rendered.get(figure_id) {
                let asset = manager.register_file(figure_id, path)?;
                assets.insert(figure_id.to_string(), asset);
            }
        }
        for figure_id in rendered.keys() {
            if !seen.contains(figure_id.as_str()) {
                log::debug!("figure {} is rendered but never referenced", figure_id);
            }
        }

        let body = render_document(doc, &self.resolver, layout, &assets)?;
        let section_xml = prepared.section.render(&body.xml);
        validate_xml(&section_xml)?;
        fs::write(root.join(&opts.section_member), section_xml)?;

        let mut toc_entries = 0;
        if let (Some(member), Some(preamble)) = (&opts.toc_member, &prepared.toc) {
            let outline = doc.outline();
            let toc = render_toc(&outline, &self.resolver, layout)?;
            let toc_xml = preamble.render(&toc.xml);
            validate_xml(&toc_xml)?;
            fs::write(root.join(member), toc_xml)?;
            toc_entries = toc.entries;
        }
        stage(AssemblyStage::BodyInjected);

        manager.write_to(&root.join(&opts.bin_dir))?;
        stage(AssemblyStage::AssetsRegistered);

        let registered: Vec<ImageAsset> = manager.assets().cloned().collect();
        let manifest_xml = prepared.manifest.with_items(&registered, &opts.bin_dir)?;
        fs::write(root.join(&opts.manifest_member), manifest_xml)?;
        stage(AssemblyStage::ManifestUpdated);

        let archive_files = repackage(root, output)?;
        stage(AssemblyStage::Repackaged);

        scratch.close()?;
        stage(AssemblyStage::Done);

        log::debug!(
            "assembled {} sections, {} images, {} placeholders into {}",
            body.sections.len(),
            registered.len(),
            body.placeholders.len(),
            output.display()
        );

        Ok(AssemblyReport {
            output: output.to_path_buf(),
            sections: body.sections,
            assets: registered,
            placeholders: body.placeholders,
            toc_entries,
            archive_files,
        })
    }

    fn prepare(&self, template: &Path) -> Result<Prepared> {
        let opts = &self.options;
        let template = TemplatePackage::open(template)?;

        let section = SectionPreamble::parse(&template.member_text(&opts.section_member)?)?;
        let toc = match &opts.toc_member {
            Some(member) => Some(SectionPreamble::parse(&template.member_text(member)?)?),
            None => None,
        };
        let manifest = Manifest::parse(&template.member_text(&opts.manifest_member)?)?;

        let highest_id = manifest
            .highest_asset_id()
            .max(template.highest_bin_id(&opts.bin_dir));
        log::debug!(
            "template {}: {} members, highest asset id {}",
            template.path().display(),
            template.len(),
            highest_id
        );

        Ok(Prepared {
            template,
            section,
            toc,
            manifest,
            highest_id,
        })
    }
}
