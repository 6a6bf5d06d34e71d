//! Redaction pipeline: rasterize marked pages, rebuild, sanitize.
//!
//! [`RedactionService`] drives the [`PageRasterizer`] once per page that
//! carries at least one area, hands the masks to the
//! [`DocumentReconstructor`], then runs the metadata sanitizer over the
//! result. Every step runs to completion before any output is produced, so a
//! failure anywhere yields an error and no document.

pub mod metadata;
pub mod options;
pub mod rasterizer;
pub mod reconstruct;
pub mod renderer;

pub use metadata::{sanitize_metadata, SANITIZED_INFO_FIELDS};
pub use options::RedactionOptions;
pub use rasterizer::{PageRasterizer, RasterMask};
pub use reconstruct::DocumentReconstructor;
#[cfg(feature = "mupdf")]
pub use renderer::MupdfRenderer;
pub use renderer::{default_renderer, PageRenderer};

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, instrument};

use crate::document::SourceDocument;
use crate::domain::Area;
use crate::error::{RedactorError, RedactorResult};

/// Output of an apply run together with its statistics.
#[derive(Debug, Clone, Default)]
pub struct RedactionReport {
    /// The redacted document.
    pub output: Vec<u8>,

    /// Pages in the source (and output) document
    pub pages_processed: usize,

    /// Pages replaced by a masked raster
    pub pages_rasterized: usize,

    /// Areas painted across all pages
    pub areas_applied: usize,
}

/// Redaction service coordinating rendering, reconstruction and
/// sanitization.
pub struct RedactionService {
    renderer: Box<dyn PageRenderer>,
    options: RedactionOptions,
}

impl RedactionService {
    /// Creates a new redaction service with the specified renderer.
    pub fn new(renderer: Box<dyn PageRenderer>) -> Self {
        Self {
            renderer,
            options: RedactionOptions::default(),
        }
    }

    /// Creates a service backed by the renderer compiled into this build.
    pub fn with_default_renderer() -> RedactorResult<Self> {
        Ok(Self::new(default_renderer()?))
    }

    pub fn with_options(mut self, options: RedactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RedactionOptions {
        &self.options
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    /// Applies `areas` to the document in `source` and returns the new
    /// document's bytes.
    pub fn apply(&self, source: &[u8], areas: &[Area]) -> RedactorResult<Vec<u8>> {
        self.apply_with_report(source, areas).map(|report| report.output)
    }

    /// Like [`RedactionService::apply`], also reporting what was done.
    #[instrument(skip_all, fields(source_len = source.len(), areas = areas.len(), renderer = self.renderer.name()))]
    pub fn apply_with_report(
        &self,
        source: &[u8],
        areas: &[Area],
    ) -> RedactorResult<RedactionReport> {
        if areas.is_empty() {
            return Err(RedactorError::NoAreasSpecified);
        }
        self.options.validate()?;

        let document = SourceDocument::load(source)?;
        let by_page = group_by_page(&document, areas)?;

        let rasterizer = PageRasterizer::new(self.renderer.as_ref(), &self.options);
        let mut masks = BTreeMap::new();
        for (&page_index, page_areas) in &by_page {
            let page_size = document
                .page_size(page_index)
                .ok_or_else(|| RedactorError::InvalidArea {
                    page_index,
                    reason: "page not found".to_string(),
                })?;
            let mask = rasterizer.rasterize(source, page_index, page_size, page_areas)?;
            masks.insert(page_index, mask);
        }

        let mut output_doc = DocumentReconstructor::reconstruct(&document, &masks)?;
        sanitize_metadata(&mut output_doc);

        let mut output = Vec::new();
        output_doc
            .save_to(&mut output)
            .map_err(|e| RedactorError::OutputFailed {
                reason: e.to_string(),
            })?;

        let report = RedactionReport {
            output,
            pages_processed: document.page_count(),
            pages_rasterized: masks.len(),
            areas_applied: areas.len(),
        };

        info!(
            pages = report.pages_processed,
            rasterized = report.pages_rasterized,
            areas = report.areas_applied,
            output_len = report.output.len(),
            "Redactions applied"
        );
        Ok(report)
    }

    /// Reads `input`, applies `areas`, and writes the result to `output`.
    ///
    /// Nothing is written unless the whole run succeeds.
    pub fn apply_file(
        &self,
        input: &Path,
        output: &Path,
        areas: &[Area],
    ) -> RedactorResult<RedactionReport> {
        let source = std::fs::read(input).map_err(|e| RedactorError::Io {
            path: input.to_path_buf(),
            source: e,
        })?;

        let report = self.apply_with_report(&source, areas)?;

        std::fs::write(output, &report.output).map_err(|e| RedactorError::Io {
            path: output.to_path_buf(),
            source: e,
        })?;
        Ok(report)
    }
}

/// Groups areas by page, preserving registration order within a page.
fn group_by_page(
    document: &SourceDocument,
    areas: &[Area],
) -> RedactorResult<BTreeMap<usize, Vec<Area>>> {
    let mut by_page: BTreeMap<usize, Vec<Area>> = BTreeMap::new();
    for area in areas {
        if area.page_index() >= document.page_count() {
            return Err(RedactorError::InvalidArea {
                page_index: area.page_index(),
                reason: format!("document has {} page(s)", document.page_count()),
            });
        }
        by_page.entry(area.page_index()).or_default().push(area.clone());
    }
    Ok(by_page)
}
