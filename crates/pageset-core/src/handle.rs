//! Loaded PDF document handle

use crate::error::PageSetError;
use lopdf::{Document, ObjectId};

/// One parsed PDF document.
///
/// The page list is captured at load time, so `page_count` never changes for
/// the lifetime of the handle. Transforms borrow the handle and build their
/// output from a copy of the document; nothing writes through a `&PdfHandle`.
#[derive(Debug, Clone)]
pub struct PdfHandle {
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl PdfHandle {
    /// Parse a PDF from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PageSetError> {
        let document =
            Document::load_mem(bytes).map_err(|e| PageSetError::ParseError(e.to_string()))?;
        Ok(Self::from_document(document))
    }

    /// Wrap an already parsed document
    pub fn from_document(document: Document) -> Self {
        // get_pages is keyed by 1-based page number, so values come out in page order
        let page_ids = document.get_pages().into_values().collect();
        Self { document, page_ids }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at a zero-based index
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        self.page_ids.get(index).copied()
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }
}
