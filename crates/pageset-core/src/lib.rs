//! PDF page-set transforms
//!
//! Page-addressable operations over loaded PDF documents using lopdf:
//! - [`merge`]: concatenate every page of two or more documents
//! - [`split`]: keep the first half of a document
//! - [`rearrange`]: permute the pages of a document by a [`PageOrder`]
//!
//! Every operation borrows its [`PdfHandle`] inputs and serializes a new
//! document; the inputs are never modified. [`PageGrid`] models the page-grid
//! editor that explodes a document into single-page previews and reassembles
//! the survivors.

pub mod error;
pub mod grid;
pub mod handle;
pub mod info;
pub mod merge;
pub mod order;
pub mod rearrange;
pub mod split;

mod assemble;

#[cfg(test)]
mod test_support;

pub use error::PageSetError;
pub use grid::{GridMode, GridPage, PageGrid};
pub use handle::PdfHandle;
pub use info::{pdf_info, PdfInfo};
pub use merge::merge;
pub use order::PageOrder;
pub use rearrange::rearrange;
pub use split::{split, split_point};

/// Producer/Creator label written into the Info dictionary of tagged outputs.
pub const PRODUCER: &str = "docshift PDF page-set service";

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<usize, PageSetError> {
    Ok(PdfHandle::from_bytes(bytes)?.page_count())
}
