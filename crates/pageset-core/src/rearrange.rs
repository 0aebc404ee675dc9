//! Page permutation

use crate::assemble::{Assembler, Tagging};
use crate::error::PageSetError;
use crate::handle::PdfHandle;
use crate::order::PageOrder;

/// Rebuild `handle` with its pages in `order`
///
/// Output page `k` is source page `order[k] - 1`. The order is validated
/// against the source page count before any copying starts.
pub fn rearrange(handle: &PdfHandle, order: &PageOrder) -> Result<Vec<u8>, PageSetError> {
    let indices = order.to_indices(handle.page_count())?;

    let mut out = Assembler::for_sources(&[handle]);
    out.append(handle, &indices)?;
    out.finish(Tagging::Labelled)
}
