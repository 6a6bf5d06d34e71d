//! Document reconstructor: rebuilds masked pages as single-image pages.
//!
//! Pages without a mask keep their original objects untouched. A page with
//! a mask is emptied and refilled with one image XObject covering the whole
//! page; its former content streams, resources and annotations become
//! unreachable and are pruned, so they do not survive in the output file.
//! Form widgets on such a page are unlinked from their fields; a field that
//! still has widgets on other pages stays in the form.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, instrument};

use super::rasterizer::RasterMask;
use crate::document::{SourceDocument, SourcePage};
use crate::error::{RedactorError, RedactorResult};

/// Resource name of the page image on rebuilt pages.
const PAGE_IMAGE_NAME: &str = "RedactedPage";

/// Page keys dropped from a rebuilt page. Anything here could carry the
/// original page's content, or would misplace the image.
const STRIPPED_PAGE_KEYS: &[&[u8]] = &[
    b"Contents",
    b"Resources",
    b"Annots",
    b"Thumb",
    b"PieceInfo",
    b"Metadata",
    b"B",
    b"AF",
    b"AA",
    b"BleedBox",
    b"TrimBox",
    b"ArtBox",
    b"BoxColorInfo",
    b"Group",
    b"StructParents",
    b"SeparationInfo",
    b"UserUnit",
    b"Trans",
    b"PresSteps",
    b"LastModified",
];

/// Trailer keys left over from the source's cross-reference layout.
const STALE_TRAILER_KEYS: &[&[u8]] = &[
    b"Prev",
    b"XRefStm",
    b"Type",
    b"W",
    b"Index",
    b"Filter",
    b"DecodeParms",
    b"Length",
];

/// Builds the output document from a source and per-page raster masks.
pub struct DocumentReconstructor;

impl DocumentReconstructor {
    /// Produces the output document. Pages are visited in ascending order;
    /// page count and order always match the source.
    #[instrument(skip_all, fields(pages = source.page_count(), masked = masks.len()))]
    pub fn reconstruct(
        source: &SourceDocument,
        masks: &BTreeMap<usize, RasterMask>,
    ) -> RedactorResult<Document> {
        if let Some(&page_index) = masks.keys().find(|&&i| i >= source.page_count()) {
            return Err(RedactorError::InvalidArea {
                page_index,
                reason: format!("document has {} page(s)", source.page_count()),
            });
        }

        let mut doc = source.document().clone();
        let mut detached = BTreeSet::new();

        for page in source.pages() {
            match masks.get(&page.index) {
                Some(mask) => {
                    detached.extend(page_annotations(&doc, page.object_id));
                    rebuild_page(&mut doc, page, mask)?;
                    debug!(page_index = page.index, "Page rebuilt from raster");
                }
                None => debug!(page_index = page.index, "Page copied through"),
            }
        }

        if !detached.is_empty() {
            detach_annotations(&mut doc, &detached);
        }

        for key in STALE_TRAILER_KEYS {
            doc.trailer.remove(key);
        }
        let pruned = doc.prune_objects();
        debug!(pruned = pruned.len(), "Unreachable objects pruned");

        Ok(doc)
    }
}

fn rebuild_page(doc: &mut Document, page: &SourcePage, mask: &RasterMask) -> RedactorResult<()> {
    let size = page.size();
    let image_id = doc.add_object(image_xobject(mask)?);

    let content = format!(
        "q {} 0 0 {} 0 0 cm /{} Do Q",
        pdf_number(size.width),
        pdf_number(size.height),
        PAGE_IMAGE_NAME
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let page_dict = doc
        .get_object_mut(page.object_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| RedactorError::OutputFailed {
            reason: format!("page index {} is not a dictionary: {}", page.index, e),
        })?;

    for key in STRIPPED_PAGE_KEYS {
        page_dict.remove(key);
    }

    // Explicit boxes and rotation so nothing is inherited from /Pages.
    let page_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::from(size.width),
        Object::from(size.height),
    ];
    page_dict.set("MediaBox", page_box.clone());
    page_dict.set("CropBox", page_box);
    page_dict.set("Rotate", 0);
    page_dict.set(
        "Resources",
        dictionary! {
            "XObject" => dictionary! {
                PAGE_IMAGE_NAME => image_id,
            },
        },
    );
    page_dict.set("Contents", content_id);

    Ok(())
}

/// Encodes the mask as a Flate-compressed DeviceRGB image XObject.
fn image_xobject(mask: &RasterMask) -> RedactorResult<Stream> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let compress_err = |e: std::io::Error| RedactorError::OutputFailed {
        reason: format!("failed to compress page image: {}", e),
    };
    encoder.write_all(mask.image.as_raw()).map_err(compress_err)?;
    let data = encoder.finish().map_err(compress_err)?;

    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(mask.width()),
            "Height" => i64::from(mask.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        data,
    ))
}

/// Annotation ids listed on a page.
fn page_annotations(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let annots = match page.get(b"Annots") {
        Ok(Object::Reference(id)) => doc.get_object(*id).ok(),
        Ok(other) => Some(other),
        Err(_) => None,
    };
    match annots.map(Object::as_array) {
        Some(Ok(annots)) => annots
            .iter()
            .filter_map(|o| o.as_reference().ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Unlinks annotations of rebuilt pages from the form tree.
///
/// Each widget is removed from its parent's `/Kids`; a field whose kids are
/// all gone is removed from its own parent, or from `AcroForm/Fields` at the
/// top. Fields shared with widgets on other pages stay. Every detached object
/// loses the keys that can hold displayed content, since a structure tree or
/// an `/IRT` link elsewhere may keep it reachable.
fn detach_annotations(doc: &mut Document, annotations: &BTreeSet<ObjectId>) {
    let form_id = acro_form_id(doc);
    let mut pending: Vec<ObjectId> = annotations.iter().rev().copied().collect();
    let mut detached = BTreeSet::new();

    while let Some(id) = pending.pop() {
        if !detached.insert(id) {
            continue;
        }
        strip_content(doc, id);

        let parent = doc
            .get_dictionary(id)
            .ok()
            .and_then(|d| d.get(b"Parent").ok())
            .and_then(|p| p.as_reference().ok());
        let unlinked = BTreeSet::from([id]);
        match parent {
            Some(parent_id) => {
                if !detached.contains(&parent_id)
                    && retain_refs(doc, parent_id, b"Kids", &unlinked) == Some(0)
                {
                    pending.push(parent_id);
                }
            }
            None => {
                if let Some(form_id) = form_id {
                    retain_refs(doc, form_id, b"Fields", &unlinked);
                }
            }
        }
    }

    if let Some(form_id) = form_id {
        retain_refs(doc, form_id, b"CO", &detached);
    }
    debug!(detached = detached.len(), "Annotations detached from rebuilt pages");
}

/// Keys through which an annotation or field carries visible content.
const ANNOTATION_CONTENT_KEYS: &[&[u8]] = &[b"AP", b"V", b"DV", b"RV", b"Contents", b"RC", b"MK"];

fn strip_content(doc: &mut Document, id: ObjectId) {
    if let Ok(dict) = doc.get_object_mut(id).and_then(Object::as_dict_mut) {
        for key in ANNOTATION_CONTENT_KEYS {
            dict.remove(key);
        }
    }
}

/// Id of the AcroForm dictionary, moving a direct one out of the catalog.
fn acro_form_id(doc: &mut Document) -> Option<ObjectId> {
    let root_id = doc.trailer.get(b"Root").and_then(Object::as_reference).ok()?;
    let form = doc.get_dictionary(root_id).ok()?.get(b"AcroForm").ok()?.clone();
    match form {
        Object::Reference(id) => Some(id),
        Object::Dictionary(dict) => {
            let id = doc.add_object(dict);
            doc.get_object_mut(root_id)
                .and_then(Object::as_dict_mut)
                .ok()?
                .set("AcroForm", id);
            Some(id)
        }
        _ => None,
    }
}

/// Drops references to `ids` from the array under `key` in dictionary
/// `holder`, following one indirection. Returns the entries left.
fn retain_refs(
    doc: &mut Document,
    holder: ObjectId,
    key: &[u8],
    ids: &BTreeSet<ObjectId>,
) -> Option<usize> {
    let indirect = match doc.get_dictionary(holder).ok()?.get(key).ok()? {
        Object::Reference(id) => Some(*id),
        Object::Array(_) => None,
        _ => return None,
    };
    let array = match indirect {
        Some(array_id) => doc.get_object_mut(array_id).ok()?,
        None => doc
            .get_object_mut(holder)
            .and_then(Object::as_dict_mut)
            .ok()?
            .get_mut(key)
            .ok()?,
    }
    .as_array_mut()
    .ok()?;

    array.retain(|o| o.as_reference().map_or(true, |id| !ids.contains(&id)));
    Some(array.len())
}

/// Formats a point value compactly for a content stream.
fn pdf_number(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
