//! Source document access: parse bytes, enumerate pages and their sizes.
//!
//! Only as much PDF structure is read as the redaction pipeline needs: the
//! page tree, each page's visible box and rotation.

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::domain::Size;
use crate::error::{RedactorError, RedactorResult};

/// US Letter, used when a page tree carries no MediaBox at all.
const FALLBACK_MEDIA_BOX: PageBox = PageBox {
    llx: 0.0,
    lly: 0.0,
    urx: 612.0,
    ury: 792.0,
};

/// A page box in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    fn from_array(doc: &Document, items: &[Object]) -> Option<Self> {
        if items.len() != 4 {
            return None;
        }
        let mut v = [0.0_f64; 4];
        for (slot, item) in v.iter_mut().zip(items) {
            *slot = number(resolve(doc, item))?;
        }
        Some(Self {
            llx: v[0].min(v[2]),
            lly: v[1].min(v[3]),
            urx: v[0].max(v[2]),
            ury: v[1].max(v[3]),
        })
    }

    fn intersect(&self, other: &Self) -> Option<Self> {
        let b = Self {
            llx: self.llx.max(other.llx),
            lly: self.lly.max(other.lly),
            urx: self.urx.min(other.urx),
            ury: self.ury.min(other.ury),
        };
        (b.urx > b.llx && b.ury > b.lly).then_some(b)
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }
}

/// One page of the source document.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Zero-based position in the page tree.
    pub index: usize,
    pub object_id: ObjectId,
    /// Visible box (CropBox clipped to MediaBox).
    pub visible_box: PageBox,
    /// Clockwise rotation in degrees, normalized to 0/90/180/270.
    pub rotation: i64,
}

impl SourcePage {
    /// Displayed size in document points, with rotation applied.
    pub fn size(&self) -> Size {
        let (w, h) = (self.visible_box.width(), self.visible_box.height());
        if self.rotation % 180 == 0 {
            Size::new(w, h)
        } else {
            Size::new(h, w)
        }
    }
}

/// A parsed, read-only source document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    document: Document,
    pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Parses PDF bytes and enumerates the page tree.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn load(bytes: &[u8]) -> RedactorResult<Self> {
        let document = Document::load_mem(bytes)
            .map_err(|e| RedactorError::unreadable("failed to parse PDF", e))?;

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(RedactorError::SourceUnreadable {
                reason: "encrypted documents are not supported".to_string(),
                source: None,
            });
        }

        let pages: Vec<SourcePage> = document
            .get_pages()
            .into_values()
            .enumerate()
            .map(|(index, object_id)| read_page(&document, index, object_id))
            .collect();

        if pages.is_empty() {
            return Err(RedactorError::SourceUnreadable {
                reason: "document has no pages".to_string(),
                source: None,
            });
        }

        debug!(pages = pages.len(), "Source document loaded");
        Ok(Self { document, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[SourcePage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&SourcePage> {
        self.pages.get(index)
    }

    /// Displayed size of a page in document points.
    pub fn page_size(&self, index: usize) -> Option<Size> {
        self.page(index).map(SourcePage::size)
    }

    /// Displayed sizes of all pages, in page order.
    pub fn page_sizes(&self) -> Vec<Size> {
        self.pages.iter().map(SourcePage::size).collect()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn read_page(doc: &Document, index: usize, object_id: ObjectId) -> SourcePage {
    let media_box = inherited(doc, object_id, b"MediaBox")
        .and_then(|o| o.as_array().ok())
        .and_then(|a| PageBox::from_array(doc, a))
        .unwrap_or_else(|| {
            warn!(page_index = index, "Page has no MediaBox, assuming US Letter");
            FALLBACK_MEDIA_BOX
        });

    let visible_box = inherited(doc, object_id, b"CropBox")
        .and_then(|o| o.as_array().ok())
        .and_then(|a| PageBox::from_array(doc, a))
        .and_then(|crop| crop.intersect(&media_box))
        .unwrap_or(media_box);

    let rotation = inherited(doc, object_id, b"Rotate")
        .and_then(number)
        .map(|r| (r as i64).rem_euclid(360) / 90 * 90)
        .unwrap_or(0);

    SourcePage {
        index,
        object_id,
        visible_box,
        rotation,
    }
}

/// Looks up an inheritable page attribute, walking `/Parent` links.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    // Bounded walk: malformed trees can contain /Parent cycles.
    for _ in 0..64 {
        let id = current?;
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}
