//! Area-based PDF redaction by page rasterization.
//!
//! Regions are marked as rectangles on rendered previews of a document's
//! pages. Applying them renders each marked page to an image, paints the
//! regions opaque, and replaces the page with that image. Pages without
//! marks are carried over untouched. Identifying document metadata is
//! cleared on every output.
//!
//! Because a redacted page is nothing but pixels, no text, vector or font
//! data from under a mark survives in the output.
//!
//! # Architecture
//!
//! - [`domain`]: Geometry, marked areas and the per-page area registry
//! - [`document`]: Source parsing, page sizes and visible boxes
//! - [`redaction`]: Rasterizer, reconstructor, metadata sanitizer and the service tying them together
//! - [`session`]: Preview session with stale-render protection
//! - [`error`]: Error taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use redactor::domain::{Area, Rect};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = std::fs::read("statement.pdf")?;
//!
//! // Drawn on a 306x396 px preview of the first page.
//! let areas = [Area::captured(0, Rect::new(40.0, 60.0, 180.0, 24.0), 306.0, 396.0)];
//!
//! let redacted = redactor::apply_redactions(&source, &areas)?;
//! std::fs::write("statement-redacted.pdf", redacted)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Coordinates
//!
//! Preview pixels have a top-left origin; document points have a
//! bottom-left origin.
//!
//! ```
//! use redactor::domain::{Rect, Size};
//!
//! let pts = redactor::normalize_coordinates(
//!     Rect::new(0.0, 180.0, 20.0, 20.0),
//!     Size::new(150.0, 200.0),
//!     Size::new(150.0, 200.0),
//! );
//! assert_eq!(pts, Rect::new(0.0, 0.0, 20.0, 20.0));
//! ```

pub mod document;
pub mod domain;
pub mod error;
pub mod redaction;
pub mod session;

pub use document::{SourceDocument, SourcePage};
pub use domain::{normalize_coordinates, Area, AreaRegistry, Point, Rect, Size};
pub use error::{RedactorError, RedactorResult};
pub use redaction::{
    default_renderer, PageRenderer, RedactionOptions, RedactionReport, RedactionService,
};
pub use session::{PreviewSession, RenderOutcome, RenderTicket, SessionState};

/// Applies `areas` to the PDF in `source` with the default renderer and
/// options, returning the redacted document.
///
/// Fails with [`RedactorError::NoAreasSpecified`] before touching `source`
/// when `areas` is empty.
pub fn apply_redactions(source: &[u8], areas: &[Area]) -> RedactorResult<Vec<u8>> {
    if areas.is_empty() {
        return Err(RedactorError::NoAreasSpecified);
    }
    RedactionService::with_default_renderer()?.apply(source, areas)
}

/// Extracts the text layer of a PDF, for verifying redacted output.
pub fn extract_text(source: &[u8]) -> RedactorResult<String> {
    pdf_extract::extract_text_from_mem(source).map_err(|e| RedactorError::TextExtraction {
        reason: e.to_string(),
    })
}
