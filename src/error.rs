//! Error types for the PDF redaction library.
//!
//! Every failure of an apply run is terminal: the caller either receives a
//! complete output document or one of these errors, never partial output.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for redaction operations.
pub type RedactorResult<T> = Result<T, RedactorError>;

/// Boxed underlying cause carried by backend-facing variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error type for all redaction operations.
#[derive(Debug, Error)]
pub enum RedactorError {
    /// The source document bytes could not be parsed into a page tree.
    #[error("source document is unreadable: {reason}")]
    SourceUnreadable {
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A page could not be rasterized by the rendering backend.
    #[error("failed to render page index {page_index}: {reason}")]
    PageRenderFailed {
        page_index: usize,
        reason: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Apply was requested without any marked areas.
    #[error("no redaction areas specified")]
    NoAreasSpecified,

    /// No rendering engine is available to rasterize pages.
    #[error("rendering backend '{backend}' is not available")]
    RenderingBackendUnavailable { backend: String },

    /// An area cannot be applied to the source document.
    #[error("invalid area on page index {page_index}: {reason}")]
    InvalidArea { page_index: usize, reason: String },

    /// Redaction options are out of range.
    #[error("invalid redaction options: {reason}")]
    InvalidOptions { reason: String },

    /// The output document could not be assembled or serialized.
    #[error("failed to write output document: {reason}")]
    OutputFailed { reason: String },

    /// Error occurred while reading or writing files
    #[error("IO error for path '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Text extraction failed
    #[error("text extraction failed: {reason}")]
    TextExtraction { reason: String },
}

impl RedactorError {
    /// Builds a [`RedactorError::SourceUnreadable`] from a parser error.
    pub fn unreadable<E>(reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SourceUnreadable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`RedactorError::PageRenderFailed`] without an underlying cause.
    pub fn render_failed(page_index: usize, reason: impl Into<String>) -> Self {
        Self::PageRenderFailed {
            page_index,
            reason: reason.into(),
            source: None,
        }
    }

    /// Returns the zero-based page index the error refers to, if any.
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Self::PageRenderFailed { page_index, .. } | Self::InvalidArea { page_index, .. } => {
                Some(*page_index)
            }
            _ => None,
        }
    }
}
