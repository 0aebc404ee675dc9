//! Page-order specification for rearranging a document
//!
//! A page order is the complete target sequence of 1-based page numbers,
//! e.g. `"3,1,2"`. It must name every page of the source exactly once.

use crate::error::PageSetError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrder(Vec<u32>);

impl PageOrder {
    pub fn new(pages: Vec<u32>) -> Self {
        Self(pages)
    }

    /// `1, 2, ..., page_count`
    pub fn identity(page_count: usize) -> Self {
        Self((1..=page_count as u32).collect())
    }

    /// Parse the comma-separated transport form. Whitespace around entries is
    /// ignored; empty entries and non-integers are rejected.
    pub fn parse(input: &str) -> Result<Self, PageSetError> {
        Self::parse_entries(input, None)
    }

    /// Parse and validate against a document of `page_count` pages in one
    /// step. Every rejection names the expected page range.
    pub fn parse_for(input: &str, page_count: usize) -> Result<Self, PageSetError> {
        let order = Self::parse_entries(input, Some(page_count))?;
        order.to_indices(page_count)?;
        Ok(order)
    }

    fn parse_entries(input: &str, page_count: Option<usize>) -> Result<Self, PageSetError> {
        let expected = match page_count {
            Some(n) => format!(", expected each of 1-{} exactly once", n),
            None => String::new(),
        };

        if input.trim().is_empty() {
            return Err(PageSetError::Validation(format!(
                "Page order is empty{}",
                expected
            )));
        }

        let mut pages = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            let page: u32 = part.parse().map_err(|_| {
                PageSetError::Validation(format!(
                    "Invalid page number in page order: '{}'{}",
                    part, expected
                ))
            })?;
            pages.push(page);
        }
        Ok(Self(pages))
    }

    pub fn pages(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the order against a document of `page_count` pages and return the
    /// zero-based source index for each output position.
    pub fn to_indices(&self, page_count: usize) -> Result<Vec<usize>, PageSetError> {
        if self.0.len() != page_count {
            return Err(PageSetError::Validation(format!(
                "Invalid page order: got {} pages, expected each of 1-{} exactly once",
                self.0.len(),
                page_count
            )));
        }

        let mut seen = vec![false; page_count];
        let mut indices = Vec::with_capacity(page_count);
        for &page in &self.0 {
            if page == 0 || page as usize > page_count {
                return Err(PageSetError::Validation(format!(
                    "Invalid page order: page {} is out of range, expected each of 1-{} exactly once",
                    page, page_count
                )));
            }
            let index = page as usize - 1;
            if seen[index] {
                return Err(PageSetError::Validation(format!(
                    "Invalid page order: page {} appears more than once, expected each of 1-{} exactly once",
                    page, page_count
                )));
            }
            seen[index] = true;
            indices.push(index);
        }

        Ok(indices)
    }
}

impl FromStr for PageOrder {
    type Err = PageSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}
