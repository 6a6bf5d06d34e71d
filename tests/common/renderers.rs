//! Fake page renderers for exercising the pipeline without a rendering
//! engine.

use image::{Rgba, RgbaImage};
use redactor::error::{RedactorError, RedactorResult};
use redactor::{PageRenderer, SourceDocument};

/// Size the renderer is expected to produce for `page_index` at `scale`.
fn expected_dimensions(document: &[u8], page_index: usize, scale: f32) -> RedactorResult<(u32, u32)> {
    let source = SourceDocument::load(document)?;
    let size = source
        .page_size(page_index)
        .ok_or_else(|| RedactorError::render_failed(page_index, "no such page"))?;
    let scale = f64::from(scale);
    Ok((
        ((size.width * scale).floor() as u32).max(1),
        ((size.height * scale).floor() as u32).max(1),
    ))
}

/// Renders every page as a solid color.
pub struct SolidRenderer {
    pub color: Rgba<u8>,
}

impl SolidRenderer {
    pub fn white() -> Self {
        Self {
            color: Rgba([255, 255, 255, 255]),
        }
    }
}

impl PageRenderer for SolidRenderer {
    fn render_page(&self, document: &[u8], page_index: usize, scale: f32) -> RedactorResult<RgbaImage> {
        let (w, h) = expected_dimensions(document, page_index, scale)?;
        Ok(RgbaImage::from_pixel(w, h, self.color))
    }

    fn name(&self) -> &str {
        "Solid"
    }
}

/// Fails on one page, renders white elsewhere.
pub struct FailingRenderer {
    pub fail_on: usize,
}

impl PageRenderer for FailingRenderer {
    fn render_page(&self, document: &[u8], page_index: usize, scale: f32) -> RedactorResult<RgbaImage> {
        if page_index == self.fail_on {
            return Err(RedactorError::render_failed(page_index, "simulated engine failure"));
        }
        SolidRenderer::white().render_page(document, page_index, scale)
    }

    fn name(&self) -> &str {
        "Failing"
    }
}
