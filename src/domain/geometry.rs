//! Rectangles, sizes and the coordinate normalizer.
//!
//! Two families of coordinate space are in play:
//!
//! - **pixel spaces** (capture contexts, preview renders, the rasterizer's
//!   canvas): origin top-left, Y grows downward;
//! - **document point space**: origin bottom-left, Y grows upward.
//!
//! Conversions use independent X and Y scale factors. No rotation or shear is
//! modeled.

/// Width and height of a coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A point in some pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle: `x`/`y` is the origin corner, extents are
/// non-negative once normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Flips negative extents so that `x`/`y` is the minimum corner.
    pub fn normalized(&self) -> Self {
        Self::from_corners(
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Clamps the rectangle into `[0, bounds.width] x [0, bounds.height]`.
    pub fn clamp_to(&self, bounds: Size) -> Self {
        let r = self.normalized();
        let x0 = clamp_axis(r.x, bounds.width);
        let y0 = clamp_axis(r.y, bounds.height);
        let x1 = clamp_axis(r.right(), bounds.width);
        let y1 = clamp_axis(r.bottom(), bounds.height);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

/// Independent X/Y factors mapping one space onto another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub const fn uniform(factor: f64) -> Self {
        Self {
            x: factor,
            y: factor,
        }
    }

    /// Factors from `from` onto `to`. A missing or degenerate source space
    /// yields `fallback` on both axes instead of failing.
    pub fn between(from: Option<Size>, to: Size, fallback: f64) -> Self {
        match from {
            Some(from) if from.is_usable() => Self {
                x: to.width / from.width,
                y: to.height / from.height,
            },
            _ => Self::uniform(fallback),
        }
    }

    /// Scales a rectangle without changing orientation.
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.x,
            rect.y * self.y,
            rect.width * self.x,
            rect.height * self.y,
        )
    }
}

/// Pixel rect in `from` space to the same-orientation pixel rect in `to`
/// space (scaling only, no clamping).
pub fn project_rect(rect: Rect, from: Option<Size>, to: Size) -> Rect {
    ScaleFactors::between(from, to, 1.0).apply(rect)
}

/// Projects a capture-space rectangle into a raster's pixel space and clamps
/// it to the raster bounds.
///
/// `fallback_scale` is used on both axes when the capture size is missing.
pub fn project_to_raster(
    rect: Rect,
    capture: Option<Size>,
    raster: Size,
    fallback_scale: f64,
) -> Rect {
    ScaleFactors::between(capture, raster, fallback_scale)
        .apply(rect.normalized())
        .clamp_to(raster)
}

/// Converts a pixel rectangle drawn against a `capture_size` context into
/// document point space for a page of `page_size` points.
///
/// The pixel rectangle's bottom edge becomes the point rectangle's `y`
/// origin, since point space grows upward from the bottom of the page.
pub fn normalize_coordinates(pixel_rect: Rect, capture_size: Size, page_size: Size) -> Rect {
    let scale = ScaleFactors::between(Some(capture_size), page_size, 1.0);
    let r = pixel_rect.normalized();
    Rect {
        x: r.x * scale.x,
        y: page_size.height - (r.y + r.height) * scale.y,
        width: r.width * scale.x,
        height: r.height * scale.y,
    }
}
