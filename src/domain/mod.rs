//! Rendering-free model of a redaction session.
//!
//! This module holds the geometry that lets a rectangle drawn in one
//! rendering context be reapplied in another, and the registry of marked
//! areas. Nothing here touches document bytes.

pub mod area;
pub mod gesture;
pub mod geometry;

pub use area::{
    Area, AreaRegistry, PageRecord, DEFAULT_DELETE_CONTROL_SIZE, DEFAULT_MIN_AREA_SIZE,
};
pub use geometry::{
    normalize_coordinates, project_rect, project_to_raster, Point, Rect, ScaleFactors, Size,
};
pub use gesture::DragGesture;
