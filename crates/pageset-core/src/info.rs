//! PDF validation and info extraction
//!
//! Used by the page grid to size itself before the document is exploded.

use crate::error::PageSetError;
use crate::handle::PdfHandle;
use lopdf::{Document, Object};
use serde::Serialize;

/// PDF file information
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: usize,
    /// PDF version from the header (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    /// Document author from metadata (if available)
    pub author: Option<String>,
}

/// Validate a PDF file and extract basic info
pub fn pdf_info(bytes: &[u8]) -> Result<PdfInfo, PageSetError> {
    if bytes.len() < 8 {
        return Err(PageSetError::ParseError(
            "File too small to be a valid PDF".into(),
        ));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(PageSetError::ParseError(
            "Not a valid PDF file (missing %PDF- header)".into(),
        ));
    }

    let handle = PdfHandle::from_bytes(bytes)?;
    if handle.page_count() == 0 {
        return Err(PageSetError::Validation("PDF has no pages".into()));
    }

    let document = handle.document();
    Ok(PdfInfo {
        page_count: handle.page_count(),
        version: extract_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title: info_string(document, b"Title"),
        author: info_string(document, b"Author"),
    })
}

/// Extract PDF version from header: `%PDF-1.7`
fn extract_version(bytes: &[u8]) -> String {
    std::str::from_utf8(&bytes[5..8])
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| "1.4".to_string())
}

fn info_string(document: &Document, key: &[u8]) -> Option<String> {
    let info_id = document.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = document.get_object(info_id).and_then(Object::as_dict).ok()?;
    let raw = info.get(key).ok()?.as_str().ok()?;
    let decoded = String::from_utf8_lossy(raw);
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}
