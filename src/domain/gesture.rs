//! Drag-to-draw input state machine.
//!
//! Turns a press/move/release stream into at most one committed rectangle.
//! Rendering never sees the gesture, only the committed result.

use super::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging {
        origin: Point,
        current: Point,
    },
    Committed(Rect),
}

impl DragGesture {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Starts a drag. A press while already dragging restarts from `point`.
    pub fn press(&mut self, point: Point) {
        *self = Self::Dragging {
            origin: point,
            current: point,
        };
    }

    /// Tracks the pointer; ignored unless dragging.
    pub fn move_to(&mut self, point: Point) {
        if let Self::Dragging { current, .. } = self {
            *current = point;
        }
    }

    /// Ends the drag. Commits and returns the rectangle when both extents
    /// reach `min_size`; otherwise the gesture falls back to idle.
    pub fn release(&mut self, point: Point, min_size: f64) -> Option<Rect> {
        let Self::Dragging { origin, .. } = *self else {
            return None;
        };

        let rect = Rect::from_corners(origin, point);
        if rect.width >= min_size && rect.height >= min_size {
            *self = Self::Committed(rect);
            Some(rect)
        } else {
            *self = Self::Idle;
            None
        }
    }

    /// Rectangle to draw as live feedback while dragging.
    pub fn preview(&self) -> Option<Rect> {
        match self {
            Self::Dragging { origin, current } => Some(Rect::from_corners(*origin, *current)),
            Self::Committed(rect) => Some(*rect),
            Self::Idle => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
