//! PDF Split algorithm
//!
//! Keeps the first half of a document. Arbitrary page subsets are produced
//! by the page grid instead (see [`crate::grid`]).

use crate::assemble::{Assembler, Tagging};
use crate::error::PageSetError;
use crate::handle::PdfHandle;

/// Number of pages kept by [`split`]: `ceil(page_count / 2)`
pub fn split_point(page_count: usize) -> usize {
    page_count.div_ceil(2)
}

/// Extract pages `[0, ceil(page_count / 2))` in their original order
pub fn split(handle: &PdfHandle) -> Result<Vec<u8>, PageSetError> {
    let page_count = handle.page_count();
    if page_count <= 1 {
        return Err(PageSetError::Validation(
            "PDF must have more than one page to split".into(),
        ));
    }

    let keep: Vec<usize> = (0..split_point(page_count)).collect();

    let mut out = Assembler::for_sources(&[handle]);
    out.append(handle, &keep)?;
    out.finish(Tagging::Untouched)
}
