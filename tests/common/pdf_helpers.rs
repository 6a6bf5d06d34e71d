//! PDF inspection helpers.

use anyhow::{Context, Result};
use flate2::read::ZlibDecoder;
use image::{Rgb, RgbImage};
use lopdf::{Document, Object, ObjectId};
use std::io::Read;

/// Page object ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Info dictionary of a document.
pub fn info_dict(doc: &Document) -> Result<lopdf::Dictionary> {
    let id = doc.trailer.get(b"Info")?.as_reference()?;
    Ok(doc.get_dictionary(id)?.clone())
}

/// Value of a string field in the Info dictionary.
pub fn info_field(doc: &Document, field: &str) -> Result<String> {
    let info = info_dict(doc)?;
    let raw = info.get(field.as_bytes())?.as_str()?;
    Ok(String::from_utf8_lossy(raw).into_owned())
}

/// Concatenated bytes of every stream in the file, decompressed where
/// possible.
pub fn all_stream_bytes(doc: &Document) -> Vec<u8> {
    let mut out = Vec::new();
    for object in doc.objects.values() {
        if let Object::Stream(stream) = object {
            match stream.decompressed_content() {
                Ok(content) => out.extend_from_slice(&content),
                Err(_) => out.extend_from_slice(&stream.content),
            }
        }
    }
    out
}

/// Whether `needle` occurs anywhere in the file's streams.
pub fn streams_contain(doc: &Document, needle: &str) -> bool {
    let haystack = all_stream_bytes(doc);
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

/// Decodes the single image on a rebuilt page.
pub fn page_image(doc: &Document, page_id: ObjectId) -> Result<RgbImage> {
    let page = doc.get_dictionary(page_id)?;
    let resources = match page.get(b"Resources")? {
        Object::Reference(id) => doc.get_dictionary(*id)?,
        Object::Dictionary(dict) => dict,
        other => anyhow::bail!("unexpected Resources object: {:?}", other),
    };
    let xobjects = resources.get(b"XObject")?.as_dict()?;
    let (_, image_ref) = xobjects.iter().next().context("page has no XObject")?;
    let stream = doc.get_object(image_ref.as_reference()?)?.as_stream()?;

    let width = stream.dict.get(b"Width")?.as_i64()? as u32;
    let height = stream.dict.get(b"Height")?.as_i64()? as u32;
    // lopdf declines to decode image streams; they are plain zlib here.
    let mut pixels = Vec::new();
    ZlibDecoder::new(stream.content.as_slice()).read_to_end(&mut pixels)?;
    RgbImage::from_raw(width, height, pixels).context("image data does not match its size")
}

/// Whether every pixel of the given region is `color`.
pub fn region_is(image: &RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) -> bool {
    (y..y + h).all(|py| (x..x + w).all(|px| *image.get_pixel(px, py) == color))
}
