//! Page-render service seam and the MuPDF backend.
//!
//! The rasterizer never talks to a rendering engine directly; it asks a
//! [`PageRenderer`] for the visual content of one page at a given scale.

use image::RgbaImage;

use crate::error::RedactorResult;

/// Renders the visual content of one document page to pixels.
///
/// Implementations may return transparent pixels; callers composite the
/// result over an opaque background.
pub trait PageRenderer: Send + Sync {
    /// Renders zero-based page `page_index` of `document` at `scale` pixels
    /// per document point.
    fn render_page(
        &self,
        document: &[u8],
        page_index: usize,
        scale: f32,
    ) -> RedactorResult<RgbaImage>;

    /// Returns a human-readable name for this renderer.
    fn name(&self) -> &str;
}

/// Returns the renderer compiled into this build.
pub fn default_renderer() -> RedactorResult<Box<dyn PageRenderer>> {
    #[cfg(feature = "mupdf")]
    {
        Ok(Box::new(MupdfRenderer::new()))
    }
    #[cfg(not(feature = "mupdf"))]
    {
        Err(crate::error::RedactorError::RenderingBackendUnavailable {
            backend: "mupdf".to_string(),
        })
    }
}

#[cfg(feature = "mupdf")]
pub use self::mupdf_backend::MupdfRenderer;

#[cfg(feature = "mupdf")]
mod mupdf_backend {
    use std::sync::{Mutex, PoisonError};

    use image::{Rgba, RgbaImage};
    use mupdf::{Colorspace, Document, Matrix, Pixmap};
    use tracing::debug;

    use super::PageRenderer;
    use crate::error::{RedactorError, RedactorResult};

    // MuPDF font loading is not thread-safe; renders are serialized.
    static MUPDF_LOCK: Mutex<()> = Mutex::new(());

    /// Renders pages with MuPDF.
    #[derive(Debug, Clone, Default)]
    pub struct MupdfRenderer;

    impl MupdfRenderer {
        pub fn new() -> Self {
            Self
        }
    }

    impl PageRenderer for MupdfRenderer {
        fn render_page(
            &self,
            document: &[u8],
            page_index: usize,
            scale: f32,
        ) -> RedactorResult<RgbaImage> {
            let _guard = MUPDF_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

            let render_err = |message: &str, e: mupdf::Error| RedactorError::PageRenderFailed {
                page_index,
                reason: format!("{}: {}", message, e),
                source: Some(Box::new(e)),
            };

            let doc = Document::from_bytes(document, "application/pdf")
                .map_err(|e| render_err("failed to open document with MuPDF", e))?;
            let page_no = i32::try_from(page_index)
                .map_err(|_| RedactorError::render_failed(page_index, "page index out of range"))?;
            let page = doc
                .load_page(page_no)
                .map_err(|e| render_err("failed to load page", e))?;

            let matrix = Matrix::new_scale(scale, scale);
            let pixmap = page
                .to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)
                .map_err(|e| render_err("failed to rasterize page", e))?;

            debug!(
                page_index,
                width = pixmap.width(),
                height = pixmap.height(),
                "Page rendered with MuPDF"
            );
            pixmap_to_rgba(&pixmap, page_index)
        }

        fn name(&self) -> &str {
            "MuPDF"
        }
    }

    fn pixmap_to_rgba(pixmap: &Pixmap, page_index: usize) -> RedactorResult<RgbaImage> {
        let width = pixmap.width() as u32;
        let height = pixmap.height() as u32;
        let components = pixmap.n() as usize;
        let samples = pixmap.samples();

        if width == 0 || height == 0 || components < 3 {
            return Err(RedactorError::render_failed(
                page_index,
                format!(
                    "unexpected pixmap layout {}x{} with {} component(s)",
                    width, height, components
                ),
            ));
        }

        let stride = samples.len() / height as usize;
        if stride < width as usize * components {
            return Err(RedactorError::render_failed(
                page_index,
                "pixmap sample buffer is truncated",
            ));
        }

        let has_alpha = components >= 4;
        Ok(RgbaImage::from_fn(width, height, |x, y| {
            let offset = y as usize * stride + x as usize * components;
            let px = &samples[offset..offset + components];
            let alpha = if has_alpha { px[3] } else { u8::MAX };
            Rgba([px[0], px[1], px[2], alpha])
        }))
    }
}
