//! Preview session controller for the interactive marking workflow.
//!
//! A session owns the area registry for one source document and tracks which
//! page render is current. Renders are not cancelled; starting a new one
//! bumps a monotonically increasing token, and a render that completes with
//! an outdated token is discarded instead of touching session state.
//!
//! ```
//! use redactor::domain::{Rect, Size};
//! use redactor::session::{PreviewSession, RenderOutcome};
//!
//! let mut session = PreviewSession::new([Size::new(612.0, 792.0); 2]);
//!
//! let first = session.begin_render(0).unwrap();
//! let second = session.begin_render(1).unwrap();
//!
//! // The page-0 render finishes late: its result must not reach the view.
//! assert_eq!(session.complete_render(first, Size::new(306.0, 396.0)), RenderOutcome::Discarded);
//! assert_eq!(session.complete_render(second, Size::new(306.0, 396.0)), RenderOutcome::Applied);
//!
//! assert!(session.commit_area(Rect::new(10.0, 10.0, 40.0, 20.0)).unwrap());
//! assert_eq!(session.areas()[0].page_index(), 1);
//! ```

use tracing::debug;

use crate::document::SourceDocument;
use crate::domain::{Area, AreaRegistry, Point, Rect, Size};
use crate::error::RedactorResult;

/// Handle for one in-flight page render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    token: u64,
    page_index: usize,
}

impl RenderTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }
}

/// Lifecycle of a marking session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    Rendering { page_index: usize },
    /// A page is on screen at `view` pixels and accepts marks.
    Interactive { page_index: usize, view: Size },
    Closed,
}

/// What happened to a completed render.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The render was current and is now the visible page.
    Applied,
    /// A newer render or a close superseded it; its result is dropped.
    Discarded,
}

/// State of one marking session.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    registry: AreaRegistry,
    token: u64,
    state: SessionState,
}

impl PreviewSession {
    /// Opens a session over pages of the given document-space sizes.
    pub fn new(page_sizes: impl IntoIterator<Item = Size>) -> Self {
        Self::with_registry(AreaRegistry::new(page_sizes))
    }

    /// Opens a session with a preconfigured registry.
    pub fn with_registry(registry: AreaRegistry) -> Self {
        Self {
            registry,
            token: 0,
            state: SessionState::Idle,
        }
    }

    pub fn for_document(document: &SourceDocument) -> Self {
        Self::new(document.page_sizes())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    /// Replaces the source document: all areas are dropped and any pending
    /// render is invalidated.
    pub fn load_document(&mut self, page_sizes: impl IntoIterator<Item = Size>) {
        self.invalidate();
        let fresh = AreaRegistry::new(page_sizes);
        self.registry = fresh
            .with_min_area_size(self.registry.min_area_size())
            .with_delete_control_size(self.registry.delete_control_size());
        self.state = SessionState::Idle;
    }

    /// Starts rendering `page_index`, superseding any earlier render.
    ///
    /// Returns `None` when the session is closed or the page does not exist.
    pub fn begin_render(&mut self, page_index: usize) -> Option<RenderTicket> {
        if self.state == SessionState::Closed || self.registry.page(page_index).is_none() {
            return None;
        }
        self.invalidate();
        self.state = SessionState::Rendering { page_index };
        Some(RenderTicket {
            token: self.token,
            page_index,
        })
    }

    /// Whether a render started with `ticket` may still affect the session.
    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        ticket.token == self.token && self.state != SessionState::Closed
    }

    /// Completes a render whose output is `view` pixels in size.
    pub fn complete_render(&mut self, ticket: RenderTicket, view: Size) -> RenderOutcome {
        if !self.is_current(&ticket) {
            debug!(
                ticket = ticket.token,
                current = self.token,
                page_index = ticket.page_index,
                "Discarding stale render"
            );
            return RenderOutcome::Discarded;
        }
        self.state = SessionState::Interactive {
            page_index: ticket.page_index,
            view,
        };
        RenderOutcome::Applied
    }

    /// Registers a rectangle drawn on the visible page, in view pixels.
    ///
    /// Returns `Ok(false)` when no page is interactive or the mark is too
    /// small to keep.
    pub fn commit_area(&mut self, rect: Rect) -> RedactorResult<bool> {
        match self.state {
            SessionState::Interactive { page_index, view } => {
                self.registry.add_area(page_index, rect, view)
            }
            _ => Ok(false),
        }
    }

    /// Deletes the area whose delete control is under `point` on the visible
    /// page.
    pub fn delete_area_at(&mut self, point: Point) -> Option<Area> {
        match self.state {
            SessionState::Interactive { page_index, view } => {
                self.registry.remove_area_at(page_index, point, view)
            }
            _ => None,
        }
    }

    pub fn clear_page(&mut self, page_index: usize) {
        self.registry.clear_page(page_index);
    }

    pub fn clear_all(&mut self) {
        self.registry.clear_all();
    }

    /// Apply needs at least one marked area.
    pub fn can_apply(&self) -> bool {
        self.registry.count_all() > 0
    }

    /// Areas to hand to the redaction service.
    pub fn areas(&self) -> Vec<Area> {
        self.registry.areas()
    }

    /// Closes the session. Pending renders become no-ops; areas are kept for
    /// a subsequent apply.
    pub fn close(&mut self) {
        self.invalidate();
        self.state = SessionState::Closed;
    }

    fn invalidate(&mut self) {
        self.token = self.token.wrapping_add(1);
    }
}
