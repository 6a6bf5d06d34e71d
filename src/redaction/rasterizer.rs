//! Page rasterizer: renders a page and paints opaque masks over its areas.
//!
//! The output is pixel data only. Whatever text or vector objects the page
//! had are gone once the page is rebuilt from this raster.

use image::imageops;
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;
use tracing::{debug, instrument};

use super::options::RedactionOptions;
use super::renderer::PageRenderer;
use crate::domain::{project_to_raster, Area, Rect, Size};
use crate::error::{RedactorError, RedactorResult};

/// Largest raster, in pixels, a single page may be rendered to.
pub const MAX_RASTER_PIXELS: u64 = 1 << 28;

/// Masked raster of one page. Consumed by the reconstructor, never persisted.
#[derive(Debug, Clone)]
pub struct RasterMask {
    pub page_index: usize,
    pub image: RgbImage,
}

impl RasterMask {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width()), f64::from(self.height()))
    }
}

/// Renders pages through a [`PageRenderer`] and masks the marked areas.
pub struct PageRasterizer<'a> {
    renderer: &'a dyn PageRenderer,
    options: &'a RedactionOptions,
}

impl<'a> PageRasterizer<'a> {
    pub fn new(renderer: &'a dyn PageRenderer, options: &'a RedactionOptions) -> Self {
        Self { renderer, options }
    }

    /// Pixel dimensions of the raster for a page of `page_size` points.
    ///
    /// Fails with `InvalidOptions` when the scaled page would exceed
    /// [`MAX_RASTER_PIXELS`].
    pub fn raster_dimensions(&self, page_size: Size) -> RedactorResult<(u32, u32)> {
        let scale = f64::from(self.options.oversampling);
        let too_large = || RedactorError::InvalidOptions {
            reason: format!(
                "a {}x{} pt page at scale {} exceeds the {} pixel raster limit",
                page_size.width, page_size.height, scale, MAX_RASTER_PIXELS
            ),
        };
        let dim = |points: f64| -> RedactorResult<u32> {
            let pixels = (points * scale).floor();
            if !pixels.is_finite() || pixels > f64::from(u32::MAX) {
                return Err(too_large());
            }
            Ok((pixels as u32).max(1))
        };

        let (width, height) = (dim(page_size.width)?, dim(page_size.height)?);
        match u64::from(width).checked_mul(u64::from(height)) {
            Some(pixels) if pixels <= MAX_RASTER_PIXELS => Ok((width, height)),
            _ => Err(too_large()),
        }
    }

    /// Renders `page_index` and paints every area over it, in the order given.
    ///
    /// A render failure is returned as-is; there is no fallback to the
    /// unmasked page.
    #[instrument(skip(self, source, areas), fields(renderer = self.renderer.name(), areas = areas.len()))]
    pub fn rasterize(
        &self,
        source: &[u8],
        page_index: usize,
        page_size: Size,
        areas: &[Area],
    ) -> RedactorResult<RasterMask> {
        if let Some(stray) = areas.iter().find(|a| a.page_index() != page_index) {
            return Err(RedactorError::InvalidArea {
                page_index: stray.page_index(),
                reason: format!("area passed to rasterizer for page index {}", page_index),
            });
        }

        let (width, height) = self.raster_dimensions(page_size)?;
        let rendered = self
            .renderer
            .render_page(source, page_index, self.options.oversampling)?;

        if rendered.dimensions() != (width, height) {
            debug!(
                expected = ?(width, height),
                actual = ?rendered.dimensions(),
                "Renderer output size differs from raster size"
            );
        }

        let mut image = flatten_on_white(&rendered, width, height);
        let raster = Size::new(f64::from(width), f64::from(height));

        for area in areas {
            let region = project_to_raster(
                area.rect(),
                area.capture(),
                raster,
                self.options.fallback_capture_scale,
            );
            paint_mask(&mut image, region, self.options.mask_color);
        }

        debug!(page_index, width, height, "Page rasterized");
        Ok(RasterMask { page_index, image })
    }
}

/// Composites `rendered` over an opaque white canvas so transparent source
/// pixels can never expose anything beneath the page.
fn flatten_on_white(rendered: &RgbaImage, width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, rendered, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Paints `region` fully opaque. Fractional edges are widened outward so
/// that adjacent or overlapping masks leave no uncovered seam.
fn paint_mask(image: &mut RgbImage, region: Rect, color: image::Rgb<u8>) {
    if region.is_empty() {
        return;
    }
    let x0 = region.x.floor().max(0.0) as u32;
    let y0 = region.y.floor().max(0.0) as u32;
    let x1 = (region.right().ceil() as u32).min(image.width());
    let y1 = (region.bottom().ceil() as u32).min(image.height());
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let rect = PixelRect::at(x0 as i32, y0 as i32).of_size(x1 - x0, y1 - y0);
    draw_filled_rect_mut(image, rect, color);
}
