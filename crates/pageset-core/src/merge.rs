//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use crate::assemble::{Assembler, Tagging};
use crate::error::PageSetError;
use crate::handle::PdfHandle;

/// Merge two or more documents into one
///
/// Every page of every input is copied, inputs in the given order and pages in
/// their original order within each input. Nothing is skipped or deduplicated,
/// so passing the same handle twice yields its pages twice.
pub fn merge(handles: &[PdfHandle]) -> Result<Vec<u8>, PageSetError> {
    if handles.len() < 2 {
        return Err(PageSetError::Validation(
            "At least two files are required to merge".into(),
        ));
    }

    let sources: Vec<&PdfHandle> = handles.iter().collect();
    let mut out = Assembler::for_sources(&sources);

    for handle in handles {
        let indices: Vec<usize> = (0..handle.page_count()).collect();
        out.append(handle, &indices)?;
    }

    out.finish(Tagging::Labelled)
}
