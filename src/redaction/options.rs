//! Tunables for an apply run.

use image::Rgb;

use crate::error::{RedactorError, RedactorResult};

/// Raster scale relative to document points. Higher is more faithful but
/// produces larger output pages.
pub const DEFAULT_OVERSAMPLING: f32 = 2.0;

/// Raster pixels per capture pixel for areas without capture dimensions.
pub const DEFAULT_FALLBACK_CAPTURE_SCALE: f64 = 1.0;

/// Options controlling rasterization of redacted pages.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionOptions {
    pub(crate) oversampling: f32,
    pub(crate) fallback_capture_scale: f64,
    pub(crate) mask_color: Rgb<u8>,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            oversampling: DEFAULT_OVERSAMPLING,
            fallback_capture_scale: DEFAULT_FALLBACK_CAPTURE_SCALE,
            mask_color: Rgb([0, 0, 0]),
        }
    }
}

impl RedactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raster scale relative to document points.
    pub fn with_oversampling(mut self, oversampling: f32) -> Self {
        self.oversampling = oversampling;
        self
    }

    /// Sets the scale used for areas recorded without a capture size.
    pub fn with_fallback_capture_scale(mut self, scale: f64) -> Self {
        self.fallback_capture_scale = scale;
        self
    }

    /// Sets the opaque colour painted over marked areas.
    pub fn with_mask_color(mut self, rgb: [u8; 3]) -> Self {
        self.mask_color = Rgb(rgb);
        self
    }

    pub fn oversampling(&self) -> f32 {
        self.oversampling
    }

    pub fn fallback_capture_scale(&self) -> f64 {
        self.fallback_capture_scale
    }

    pub fn mask_color(&self) -> [u8; 3] {
        self.mask_color.0
    }

    /// Rejects non-finite or non-positive scales.
    pub fn validate(&self) -> RedactorResult<()> {
        if !(self.oversampling.is_finite() && self.oversampling > 0.0) {
            return Err(RedactorError::InvalidOptions {
                reason: format!("oversampling must be positive, got {}", self.oversampling),
            });
        }
        if !(self.fallback_capture_scale.is_finite() && self.fallback_capture_scale > 0.0) {
            return Err(RedactorError::InvalidOptions {
                reason: format!(
                    "fallback capture scale must be positive, got {}",
                    self.fallback_capture_scale
                ),
            });
        }
        Ok(())
    }
}
