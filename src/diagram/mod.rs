//! Diagram rasterization.
//!
//! Diagram markup is turned into images by an external collaborator behind
//! the [`DiagramRenderer`] trait. [`render_all`] runs one task per diagram on
//! a bounded rayon pool; each task owns its output path and reports back over
//! a channel, and results are merged into a map keyed by figure id only after
//! every task has joined.

mod renderer;

pub use renderer::{CommandRenderer, DirectoryRenderer};

use crate::error::{Error, Result};
use crate::model::{CaptionCatalog, DiagramSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default raster size requested from renderers.
pub const DEFAULT_RENDER_SIZE: (u32, u32) = (1920, 1080);

/// Default number of render workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Produces a raster image from diagram markup.
pub trait DiagramRenderer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Render `task` into `output`. The file must exist on success.
    fn render(&self, task: &DiagramTask, output: &Path) -> Result<()>;
}

/// One diagram to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramTask {
    /// Figure the diagram belongs to
    pub figure_id: String,
    /// Diagram markup
    pub source: String,
    /// Caption title, if known
    pub title: Option<String>,
    /// Requested width in pixels
    pub width: u32,
    /// Requested height in pixels
    pub height: u32,
}

impl DiagramTask {
    /// Create a task with the default size.
    pub fn new(figure_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            figure_id: figure_id.into(),
            source: source.into(),
            title: None,
            width: DEFAULT_RENDER_SIZE.0,
            height: DEFAULT_RENDER_SIZE.1,
        }
    }

    /// Build tasks for every diagram, titled from the caption catalog.
    pub fn from_sources(diagrams: &[DiagramSource], captions: &CaptionCatalog) -> Vec<Self> {
        diagrams
            .iter()
            .map(|d| {
                Self::new(&d.figure_id, &d.source)
                    .with_title(captions.figure_title(&d.figure_id).map(str::to_string))
            })
            .collect()
    }

    /// Set the caption title.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set the requested size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// File stem for this figure, e.g. `diagram_1_2`.
    pub fn file_stem(&self) -> String {
        format!("diagram_{}", self.figure_id.replace('-', "_"))
    }

    /// Output file name, e.g. `diagram_1_2.png`.
    pub fn output_file_name(&self) -> String {
        format!("{}.png", self.file_stem())
    }
}

/// A diagram that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFailure {
    /// Figure the diagram belongs to
    pub figure_id: String,
    /// What went wrong
    pub error: String,
}

/// Outcome of a render batch.
#[derive(Debug, Clone, Default)]
pub struct RenderBatch {
    /// Rendered image per figure id
    pub rendered: BTreeMap<String, PathBuf>,
    /// Failed figures, sorted by figure id
    pub failures: Vec<RenderFailure>,
}

impl RenderBatch {
    /// Number of diagrams attempted.
    pub fn total(&self) -> usize {
        self.rendered.len() + self.failures.len()
    }

    /// Check if every diagram rendered.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render every task in parallel on at most `max_workers` threads.
///
/// A failing task is recorded and logged; it never aborts the batch. Only
/// setup errors (work directory, thread pool) are returned as `Err`.
pub fn render_all(
    tasks: &[DiagramTask],
    renderer: &dyn DiagramRenderer,
    work_dir: &Path,
    max_workers: usize,
) -> Result<RenderBatch> {
    fs::create_dir_all(work_dir)?;
    let mut batch = RenderBatch::default();
    if tasks.is_empty() {
        return Ok(batch);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .build()
        .map_err(|e| Error::Other(format!("render pool: {}", e)))?;

    log::debug!(
        "rendering {} diagrams with {} on {} workers",
        tasks.len(),
        renderer.name(),
        pool.current_num_threads()
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    pool.scope(|scope| {
        for task in tasks {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let output = work_dir.join(task.output_file_name());
                let result = run_task(renderer, task, &output).map(|_| output);
                // receiver outlives the scope
                let _ = tx.send((task.figure_id.clone(), result));
            });
        }
    });
    drop(tx);

    for (figure_id, result) in rx.iter() {
        match result {
            Ok(path) => {
                batch.rendered.insert(figure_id, path);
            }
            Err(e) => {
                log::warn!("figure {}: {}", figure_id, e);
                batch.failures.push(RenderFailure {
                    figure_id,
                    error: e.to_string(),
                });
            }
        }
    }
    batch.failures.sort_by(|a, b| a.figure_id.cmp(&b.figure_id));

    log::debug!(
        "rendered {}/{} diagrams",
        batch.rendered.len(),
        batch.total()
    );
    Ok(batch)
}

fn run_task(renderer: &dyn DiagramRenderer, task: &DiagramTask, output: &Path) -> Result<()> {
    match &task.title {
        Some(title) => log::debug!("rendering figure {} ({})", task.figure_id, title),
        None => log::debug!("rendering figure {}", task.figure_id),
    }
    renderer.render(task, output)?;
    if !output.is_file() {
        return Err(Error::render(
            &task.figure_id,
            format!("{} produced no output", renderer.name()),
        ));
    }
    Ok(())
}
