//! Metadata sanitizer for the output document.

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

/// Info dictionary fields cleared on every output document.
pub const SANITIZED_INFO_FIELDS: [&str; 6] =
    ["Title", "Author", "Subject", "Keywords", "Producer", "Creator"];

/// Clears identifying document-level metadata.
///
/// Sets every field in [`SANITIZED_INFO_FIELDS`] to an empty string,
/// creating the Info dictionary if the document has none, and drops the
/// catalog's XMP stream, which mirrors the same fields. Page count, page
/// sizes and content are left alone. Running it twice changes nothing.
pub fn sanitize_metadata(doc: &mut Document) {
    match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => {
            let id = *id;
            match doc.get_object_mut(id).and_then(Object::as_dict_mut) {
                Ok(info) => clear_fields(info),
                Err(_) => replace_info(doc),
            }
        }
        Ok(Object::Dictionary(_)) => {
            if let Ok(Object::Dictionary(info)) = doc.trailer.get_mut(b"Info") {
                clear_fields(info);
            }
        }
        _ => replace_info(doc),
    }

    if let Ok(root_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        if let Ok(catalog) = doc.get_object_mut(root_id).and_then(Object::as_dict_mut) {
            if catalog.remove(b"Metadata").is_some() {
                debug!("Catalog XMP metadata removed");
            }
        }
    }
}

fn clear_fields(info: &mut Dictionary) {
    for field in SANITIZED_INFO_FIELDS {
        info.set(field, Object::string_literal(""));
    }
}

fn replace_info(doc: &mut Document) {
    let mut info = Dictionary::new();
    clear_fields(&mut info);
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);
}
