//! Conversion job description.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A labelled Markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSource {
    /// Section label, e.g. "Ⅰ. 서론"
    pub label: String,

    /// Markdown file
    pub path: PathBuf,
}

impl SectionSource {
    /// Create a new section source.
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

impl FromStr for SectionSource {
    type Err = Error;

    /// Parse `LABEL=PATH`. A bare path uses its file stem as the label.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Config("empty section argument".to_string()));
        }
        match s.split_once('=') {
            Some((label, path)) if !label.trim().is_empty() && !path.trim().is_empty() => {
                Ok(Self::new(label.trim(), path.trim()))
            }
            Some(_) => Err(Error::Config(format!("expected LABEL=PATH, got {:?}", s))),
            None => {
                let path = PathBuf::from(s);
                let label = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| s.to_string());
                Ok(Self { label, path })
            }
        }
    }
}

impl fmt::Display for SectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.path.display())
    }
}

/// Everything one conversion run reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionJob {
    /// Template package
    pub template: PathBuf,

    /// Body sections, in order
    pub body: Vec<SectionSource>,

    /// Appendix sections, in order
    pub appendix: Vec<SectionSource>,

    /// Output package; a timestamped name is used when absent
    pub output: Option<PathBuf>,

    /// Section member receiving a table of contents
    pub toc_member: Option<String>,

    /// Style catalog JSON
    pub styles: Option<PathBuf>,
}

impl ConversionJob {
    /// Create a job for `template`.
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            ..Default::default()
        }
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

    /// Set the output package path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Write a table of contents into `member`.
    pub fn with_toc_member(mut self, member: impl Into<String>) -> Self {
        self.toc_member = Some(member.into());
        self
    }

    /// Parse a job from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a job file. Relative paths inside it are taken relative to the
    /// file's directory.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let job = Self::from_json(&json)?;
        match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => Ok(job.relative_to(base)),
            _ => Ok(job),
        }
    }

    /// Resolve relative paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.template);
        for source in self.body.iter_mut().chain(self.appendix.iter_mut()) {
            join(&mut source.path);
        }
        if let Some(output) = self.output.as_mut() {
            join(output);
        }
        if let Some(styles) = self.styles.as_mut() {
            join(styles);
        }
        self
    }

    /// Check that the job names a template and at least one section.
    pub fn validate(&self) -> Result<()> {
        if self.template.as_os_str().is_empty() {
            return Err(Error::Config("no template given".to_string()));
        }
        if self.body.is_empty() && self.appendix.is_empty() {
            return Err(Error::Config("no sections given".to_string()));
        }
        Ok(())
    }

    /// Output path, falling back to a timestamped name.
    pub fn output_or_default<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: fmt::Display,
    {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_output_name(now)))
    }
}

/// `report_YYYYMMDD_HHMMSS.hwpx` for `now`.
pub fn default_output_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("report_{}.hwpx", now.format("%Y%m%d_%H%M%S"))
}
