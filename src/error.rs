//! Error types for mdhwpx library.

use std::io;
use thiserror::Error;

/// Result type alias for mdhwpx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling an HWPX package.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as an HWPX package.
    #[error("Unknown file format: not a valid HWPX package")]
    UnknownFormat,

    /// A required input is absent: template, markdown file, package member,
    /// or a structural marker inside a member.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Error reading the template archive.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Error writing the output archive.
    #[error("Archive write failed: {0}")]
    ArchiveWrite(String),

    /// XML member could not be parsed or written.
    #[error("XML error: {0}")]
    Xml(String),

    /// Image data could not be probed.
    #[error("Image error: {0}")]
    Image(String),

    /// A diagram failed to render.
    #[error("Diagram {figure_id} failed to render: {message}")]
    AssetRender {
        /// Figure the diagram belongs to
        figure_id: String,
        /// Underlying failure
        message: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid pattern built from parse options.
    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an `AssetRender` error.
    pub fn render(figure_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AssetRender {
            figure_id: figure_id.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts a whole conversion.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::AssetRender { .. })
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::InvalidArchive(_) => Error::UnknownFormat,
            _ => Error::Archive(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingInput("Contents/content.hpf".into());
        assert_eq!(err.to_string(), "Missing input: Contents/content.hpf");

        let err = Error::render("1-2", "mmdc exited with status 1");
        assert_eq!(
            err.to_string(),
            "Diagram 1-2 failed to render: mmdc exited with status 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_render_failures_are_recoverable() {
        assert!(!Error::render("1-1", "timeout").is_fatal());
        assert!(Error::ArchiveWrite("disk full".into()).is_fatal());
        assert!(Error::MissingInput("template".into()).is_fatal());
    }
}
