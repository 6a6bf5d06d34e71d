//! Marked areas and the per-page area registry.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::geometry::{project_rect, Point, Rect, Size};
use crate::error::{RedactorError, RedactorResult};

/// Smallest width/height, in capture pixels, of a mark the registry accepts.
pub const DEFAULT_MIN_AREA_SIZE: f64 = 5.0;

/// Edge length, in viewing-context pixels, of an area's delete control.
pub const DEFAULT_DELETE_CONTROL_SIZE: f64 = 16.0;

/// One marked rectangle on one page.
///
/// The rectangle lives in the pixel space of the context it was drawn
/// against. `capture` records that context's size; without it the rectangle
/// is taken to already be in the target raster's pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    page_index: usize,
    rect: Rect,
    capture: Option<Size>,
}

impl Area {
    pub fn new(page_index: usize, rect: Rect, capture: Option<Size>) -> Self {
        Self {
            page_index,
            rect: rect.normalized(),
            capture,
        }
    }

    /// Area drawn against a capture context of `capture_width x capture_height`.
    pub fn captured(page_index: usize, rect: Rect, capture_width: f64, capture_height: f64) -> Self {
        Self::new(
            page_index,
            rect,
            Some(Size::new(capture_width, capture_height)),
        )
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn capture(&self) -> Option<Size> {
        self.capture
    }

    /// The rectangle as seen in a viewing context of size `view`.
    pub fn rect_in(&self, view: Size) -> Rect {
        project_rect(self.rect, self.capture, view)
    }
}

static AREA_ARG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<page>\d+)\s*:\s*(?P<x>-?[\d.]+)\s*,\s*(?P<y>-?[\d.]+)\s*,\s*(?P<w>[\d.]+)\s*,\s*(?P<h>[\d.]+)\s*(?:@\s*(?P<cw>[\d.]+)\s*[xX]\s*(?P<ch>[\d.]+))?\s*$",
    )
    .expect("Valid regex pattern")
});

/// Parses `PAGE:X,Y,W,H[@CWxCH]`, e.g. `0:10,10,50,20@150x200`.
impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = AREA_ARG
            .captures(s)
            .ok_or_else(|| format!("expected PAGE:X,Y,W,H[@CWxCH], got '{}'", s))?;

        let num = |name: &str| -> Result<f64, String> {
            let raw = &caps[name];
            raw.parse::<f64>()
                .map_err(|e| format!("invalid {} value '{}': {}", name, raw, e))
        };

        let page_index = caps["page"]
            .parse::<usize>()
            .map_err(|e| format!("invalid page index: {}", e))?;
        let rect = Rect::new(num("x")?, num("y")?, num("w")?, num("h")?);
        let capture = match (caps.name("cw"), caps.name("ch")) {
            (Some(_), Some(_)) => Some(Size::new(num("cw")?, num("ch")?)),
            _ => None,
        };

        Ok(Self::new(page_index, rect, capture))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{},{},{},{}",
            self.page_index, self.rect.x, self.rect.y, self.rect.width, self.rect.height
        )?;
        if let Some(capture) = self.capture {
            write!(f, "@{}x{}", capture.width, capture.height)?;
        }
        Ok(())
    }
}

/// One page under review: its document-space size and the areas on it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub page_index: usize,
    /// Page size in document points.
    pub size: Size,
    areas: Vec<Area>,
}

impl PageRecord {
    pub fn new(page_index: usize, size: Size) -> Self {
        Self {
            page_index,
            size,
            areas: Vec::new(),
        }
    }

    /// Areas in registration order.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }
}

/// In-memory, per-page list of marked areas for one redaction session.
#[derive(Debug, Clone)]
pub struct AreaRegistry {
    pages: Vec<PageRecord>,
    min_area_size: f64,
    delete_control_size: f64,
}

impl AreaRegistry {
    /// Creates a registry with one empty record per page size.
    pub fn new(page_sizes: impl IntoIterator<Item = Size>) -> Self {
        let pages = page_sizes
            .into_iter()
            .enumerate()
            .map(|(index, size)| PageRecord::new(index, size))
            .collect();
        Self {
            pages,
            min_area_size: DEFAULT_MIN_AREA_SIZE,
            delete_control_size: DEFAULT_DELETE_CONTROL_SIZE,
        }
    }

    pub fn with_min_area_size(mut self, min_area_size: f64) -> Self {
        self.min_area_size = min_area_size;
        self
    }

    pub fn with_delete_control_size(mut self, delete_control_size: f64) -> Self {
        self.delete_control_size = delete_control_size;
        self
    }

    pub fn min_area_size(&self) -> f64 {
        self.min_area_size
    }

    pub fn delete_control_size(&self) -> f64 {
        self.delete_control_size
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, page_index: usize) -> Option<&PageRecord> {
        self.pages.get(page_index)
    }

    /// Registers a rectangle drawn against a `capture` context.
    ///
    /// Returns `Ok(false)` without registering when either extent is below
    /// the minimum size; such marks come from accidental clicks.
    pub fn add_area(&mut self, page_index: usize, rect: Rect, capture: Size) -> RedactorResult<bool> {
        let min = self.min_area_size;
        let record = self.page_mut(page_index)?;

        let rect = rect.normalized();
        if rect.width < min || rect.height < min {
            return Ok(false);
        }

        record.areas.push(Area::new(page_index, rect, Some(capture)));
        Ok(true)
    }

    /// Square delete control of an area, as seen in a `view` context: it
    /// sits inside the area with its top-right corner on the area's.
    pub fn delete_control_bounds(&self, area: &Area, view: Size) -> Rect {
        let r = area.rect_in(view);
        let s = self.delete_control_size;
        Rect::new(r.right() - s, r.y, s, s)
    }

    /// Removes the oldest area on `page_index` whose delete control contains
    /// `point` (given in the `view` context's pixels).
    pub fn remove_area_at(&mut self, page_index: usize, point: Point, view: Size) -> Option<Area> {
        let record = self.pages.get(page_index)?;
        let hit = record
            .areas
            .iter()
            .position(|area| self.delete_control_bounds(area, view).contains(point))?;
        Some(self.pages[page_index].areas.remove(hit))
    }

    pub fn clear_page(&mut self, page_index: usize) {
        if let Some(record) = self.pages.get_mut(page_index) {
            record.areas.clear();
        }
    }

    pub fn clear_all(&mut self) {
        for record in &mut self.pages {
            record.areas.clear();
        }
    }

    /// Total number of areas across all pages. Apply needs at least one.
    pub fn count_all(&self) -> usize {
        self.pages.iter().map(|p| p.areas.len()).sum()
    }

    /// All areas, ordered by page and then registration.
    pub fn areas(&self) -> Vec<Area> {
        self.pages
            .iter()
            .flat_map(|p| p.areas.iter().cloned())
            .collect()
    }

    fn page_mut(&mut self, page_index: usize) -> RedactorResult<&mut PageRecord> {
        let page_count = self.pages.len();
        self.pages
            .get_mut(page_index)
            .ok_or_else(|| RedactorError::InvalidArea {
                page_index,
                reason: format!("document has {} page(s)", page_count),
            })
    }
}
