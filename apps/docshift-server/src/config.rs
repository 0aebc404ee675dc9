//! Server configuration

use std::path::PathBuf;

/// PDF MIME types accepted by the page-set endpoints
pub const PDF_MIME_TYPES: &[&str] = &["application/pdf"];

/// Default per-file size limit for PDF uploads (10 MiB)
pub const DEFAULT_MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

/// Default maximum number of files accepted by `/merge-pdfs`
pub const DEFAULT_MAX_MERGE_FILES: usize = 10;

/// Allow-list and limits for one category of uploads
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Accepted `Content-Type` values of the file parts
    pub allowed_mime_types: &'static [&'static str],
    /// Message returned when a part has a type outside the allow-list
    pub rejection_message: &'static str,
    /// Per-file limit in bytes
    pub max_file_bytes: usize,
    /// Maximum number of files in one request
    pub max_files: usize,
}

impl UploadPolicy {
    pub fn pdf(max_file_bytes: usize, max_files: usize) -> Self {
        Self {
            allowed_mime_types: PDF_MIME_TYPES,
            rejection_message: "Only PDF files are allowed",
            max_file_bytes,
            max_files,
        }
    }

    pub fn allows(&self, content_type: &str) -> bool {
        // Ignore parameters such as `; charset=binary`
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.allowed_mime_types.iter().any(|t| *t == essence)
    }

    /// Request body ceiling: every file at its limit plus room for the
    /// multipart framing and text fields
    pub fn body_limit(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_files)
            .saturating_add(64 * 1024)
    }
}

/// Runtime configuration shared by every handler
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that receives request-scoped temp uploads
    pub temp_dir: PathBuf,
    /// Policy for the PDF page-set endpoints
    pub pdf_uploads: UploadPolicy,
}

impl Config {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            pdf_uploads: UploadPolicy::pdf(DEFAULT_MAX_PDF_BYTES, DEFAULT_MAX_MERGE_FILES),
        }
    }
}
