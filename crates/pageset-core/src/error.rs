use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageSetError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("{0}")]
    Validation(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PageSetError {
    /// True when the caller supplied something the transform refuses to run on,
    /// as opposed to the PDF library failing on the document itself.
    pub fn is_validation(&self) -> bool {
        matches!(self, PageSetError::Validation(_))
    }
}
