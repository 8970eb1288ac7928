/*!
 * Primary extraction strategy: structured extraction with lopdf.
 *
 * Besides per-page text this strategy owns everything that needs the PDF
 * object graph: the info dictionary (title/author) and embedded image
 * XObjects.
 */

use anyhow::{Context, Result};
use log::debug;
use lopdf::{Dictionary, Document, Object};

use super::{ExtractionStrategy, ImageAsset, ImageEncoding, RawPage};
use crate::extraction::DocumentInfo;

/// Structured extraction backed by lopdf
pub struct LopdfStrategy;

impl ExtractionStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<RawPage>> {
        let doc = Document::load_mem(bytes).context("Failed to load PDF document")?;

        let mut pages = Vec::new();
        for page_number in doc.get_pages().keys() {
            // A page that fails text decoding feeds the empty-page side of
            // the corruption heuristic instead of aborting the run
            let text = doc.extract_text(&[*page_number]).unwrap_or_default();
            pages.push(RawPage { text });
        }
        Ok(pages)
    }
}

/// Follow an indirect reference to its object, or return the object as-is.
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object.as_reference() {
        Ok(id) => doc.get_object(id).unwrap_or(object),
        Err(_) => object,
    }
}

fn dict_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => {
            // Try UTF-8 first, then Latin-1
            String::from_utf8(bytes.clone())
                .ok()
                .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
        }
        _ => None,
    })
}

/// Read title and author from the PDF info dictionary.
pub fn extract_info(bytes: &[u8]) -> DocumentInfo {
    let Ok(doc) = Document::load_mem(bytes) else {
        return DocumentInfo::default();
    };

    let info_dict = doc
        .trailer
        .get(b"Info")
        .ok()
        .map(|obj| resolve(&doc, obj))
        .and_then(|obj| obj.as_dict().ok());

    let Some(info_dict) = info_dict else {
        debug!("No Info dictionary in PDF");
        return DocumentInfo::default();
    };

    DocumentInfo {
        title: dict_string(info_dict, b"Title").filter(|s| !s.trim().is_empty()),
        author: dict_string(info_dict, b"Author").filter(|s| !s.trim().is_empty()),
        ..DocumentInfo::default()
    }
}

/// Read the document outline (bookmarks) as (title, page index) pairs.
///
/// Best effort: only top-level items with a direct GoTo destination are
/// returned. Named destinations and nested items are skipped, in which
/// case chapter detection falls through to the heading heuristics.
pub fn extract_outline(bytes: &[u8]) -> Vec<(String, usize)> {
    let Ok(doc) = Document::load_mem(bytes) else {
        return Vec::new();
    };

    let page_index_by_id: std::collections::HashMap<lopdf::ObjectId, usize> = doc
        .get_pages()
        .into_values()
        .enumerate()
        .map(|(index, id)| (id, index))
        .collect();

    let Some(outlines) = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .map(|obj| resolve(&doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut item = outlines.get(b"First").ok().cloned();
    // Cap the walk so a malformed Next cycle cannot loop forever
    let mut remaining = 4096usize;

    while let Some(current) = item.take() {
        if remaining == 0 {
            break;
        }
        remaining -= 1;

        let Ok(dict) = resolve(&doc, &current).as_dict() else {
            break;
        };
        if let (Some(title), Some(page)) = (
            dict_string(dict, b"Title"),
            destination_page(&doc, dict, &page_index_by_id),
        ) {
            entries.push((title, page));
        }
        item = dict.get(b"Next").ok().cloned();
    }

    entries.sort_by_key(|(_, page)| *page);
    entries
}

fn destination_page(
    doc: &Document,
    item: &Dictionary,
    page_index_by_id: &std::collections::HashMap<lopdf::ObjectId, usize>,
) -> Option<usize> {
    // Either a direct /Dest array or a /A GoTo action holding one
    let dest = match item.get(b"Dest") {
        Ok(dest) => resolve(doc, dest).clone(),
        Err(_) => {
            let action = resolve(doc, item.get(b"A").ok()?).as_dict().ok()?.clone();
            let is_goto = action
                .get(b"S")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| n == b"GoTo")
                .unwrap_or(false);
            if !is_goto {
                return None;
            }
            resolve(doc, action.get(b"D").ok()?).clone()
        }
    };

    let array = dest.as_array().ok()?;
    let page_id = array.first()?.as_reference().ok()?;
    page_index_by_id.get(&page_id).copied()
}

/// Extract embedded image XObjects, dropping anything smaller than
/// `min_dimension` pixels on either side (tiny icons and decorations).
pub fn extract_images(bytes: &[u8], min_dimension: u32) -> Vec<ImageAsset> {
    let Ok(doc) = Document::load_mem(bytes) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for (page_index, (_, page_id)) in doc.get_pages().into_iter().enumerate() {
        let Ok(page_dict) = doc.get_object(page_id).and_then(|o| o.as_dict()) else {
            continue;
        };
        let Ok(resources) = page_dict.get(b"Resources") else {
            continue;
        };
        let Ok(resources) = resolve(&doc, resources).as_dict() else {
            continue;
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            continue;
        };
        let Ok(xobjects) = resolve(&doc, xobjects).as_dict() else {
            continue;
        };

        for (_name, entry) in xobjects.iter() {
            let Object::Stream(stream) = resolve(&doc, entry) else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(|o| o.as_name())
                .map(|n| n == b"Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }

            let width = stream
                .dict
                .get(b"Width")
                .and_then(|o| o.as_i64())
                .unwrap_or(0) as u32;
            let height = stream
                .dict
                .get(b"Height")
                .and_then(|o| o.as_i64())
                .unwrap_or(0) as u32;
            if width < min_dimension || height < min_dimension {
                continue;
            }

            let data = stream.content.clone();
            let encoding = detect_encoding(&stream.dict, &data);
            images.push(ImageAsset {
                page_index,
                width,
                height,
                encoding,
                data,
            });
        }
    }

    debug!("Extracted {} images", images.len());
    images
}

fn detect_encoding(dict: &Dictionary, data: &[u8]) -> ImageEncoding {
    let filter_is_dct = match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name == b"DCTDecode",
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(name) if name == b"DCTDecode")),
        _ => false,
    };
    if filter_is_dct {
        return ImageEncoding::Jpeg;
    }

    match image::guess_format(data) {
        Ok(image::ImageFormat::Jpeg) => ImageEncoding::Jpeg,
        Ok(image::ImageFormat::Png) => ImageEncoding::Png,
        _ => ImageEncoding::Raw,
    }
}
