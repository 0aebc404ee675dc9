//! Page grid editing model
//!
//! Holds a document exploded into one single-page PDF per page, in display
//! order. The grid backs two workflows:
//!
//! - **Split**: the user deletes and reorders pages, then downloads the
//!   survivors assembled locally. No server round trip.
//! - **Rearrange**: the user only reorders; the grid emits the 1-based page
//!   order string that is submitted with the original file.

use crate::assemble::{Assembler, Tagging};
use crate::error::PageSetError;
use crate::handle::PdfHandle;
use crate::order::PageOrder;

/// Grid mode determines available operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Pages may be deleted and reordered
    Split,
    /// Pages may only be reordered
    Rearrange,
}

/// One page preview in the grid
#[derive(Debug, Clone)]
pub struct GridPage {
    /// Page number in the original document (1-indexed)
    pub original_page: u32,
    /// A standalone single-page PDF of that page
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PageGrid {
    mode: GridMode,
    page_count: usize,
    pages: Vec<GridPage>,
}

impl PageGrid {
    /// Explode `bytes` into single-page documents, in original order
    pub fn load(bytes: &[u8], mode: GridMode) -> Result<Self, PageSetError> {
        let source = PdfHandle::from_bytes(bytes)?;
        let page_count = source.page_count();
        if mode == GridMode::Split && page_count <= 1 {
            return Err(PageSetError::Validation(
                "PDF must have more than one page to split".into(),
            ));
        }

        let mut pages = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let mut out = Assembler::for_sources(&[&source]);
            out.append(&source, &[index])?;
            pages.push(GridPage {
                original_page: index as u32 + 1,
                bytes: out.finish(Tagging::Untouched)?,
            });
        }

        Ok(Self {
            mode,
            page_count,
            pages,
        })
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    /// Pages in display order
    pub fn pages(&self) -> &[GridPage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Delete the page at a display position (split mode only)
    pub fn remove(&mut self, position: usize) -> Result<GridPage, PageSetError> {
        if self.mode == GridMode::Rearrange {
            return Err(PageSetError::Validation(
                "Pages cannot be deleted while rearranging".into(),
            ));
        }
        self.check_position(position)?;
        Ok(self.pages.remove(position))
    }

    /// Move the page at `from` so that it ends up at display position `to`
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), PageSetError> {
        self.check_position(from)?;
        self.check_position(to)?;
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        Ok(())
    }

    /// Original page numbers in display order
    pub fn page_order(&self) -> PageOrder {
        PageOrder::new(self.pages.iter().map(|p| p.original_page).collect())
    }

    /// Comma-separated order submitted to the rearrange endpoint.
    ///
    /// Fails if pages were deleted, since the server requires every page
    /// exactly once.
    pub fn order_string(&self) -> Result<String, PageSetError> {
        let order = self.page_order();
        order.to_indices(self.page_count)?;
        Ok(order.to_string())
    }

    /// Assemble the surviving pages, in display order, into one document
    pub fn assemble(&self) -> Result<Vec<u8>, PageSetError> {
        if self.pages.is_empty() {
            return Err(PageSetError::Validation("No pages left to download".into()));
        }

        let handles = self
            .pages
            .iter()
            .map(|p| PdfHandle::from_bytes(&p.bytes))
            .collect::<Result<Vec<_>, _>>()?;

        let sources: Vec<&PdfHandle> = handles.iter().collect();
        let mut out = Assembler::for_sources(&sources);
        for handle in &handles {
            out.append(handle, &[0])?;
        }
        out.finish(Tagging::Untouched)
    }

    fn check_position(&self, position: usize) -> Result<(), PageSetError> {
        if position >= self.pages.len() {
            return Err(PageSetError::Validation(format!(
                "Page position {} out of bounds (grid has {} pages)",
                position,
                self.pages.len()
            )));
        }
        Ok(())
    }
}
