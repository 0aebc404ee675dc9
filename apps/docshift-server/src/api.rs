//! API handlers for the docshift server
//!
//! Every file-bearing handler follows the same sequence: read the multipart
//! body under the PDF upload policy, persist the files as temp uploads, load
//! and transform on the blocking pool, release the temp uploads, then stream
//! the result back as an attachment. Release happens before the transform
//! result is inspected, so failures clean up exactly like successes.

use axum::{
    extract::{Multipart, State},
    response::Response,
    Json,
};
use chrono::Utc;
use pageset_core::{PageOrder, PageSetError, PdfHandle, PdfInfo};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::response::{attachment, merged_filename, PDF_CONTENT_TYPE};
use crate::uploads::{display_stem, release_all, TempUpload, UploadForm};
use crate::AppState;

/// Multipart field carrying the inputs of `/merge-pdfs`
pub const MERGE_FILES_FIELD: &str = "pdfFiles";
/// Multipart field carrying the input of the single-file endpoints
pub const PDF_FILE_FIELD: &str = "pdfFile";
/// Text field carrying the page order for `/rearrange-pdf`
pub const PAGE_ORDER_FIELD: &str = "pageOrder";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "docshift-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /merge-pdfs
pub async fn handle_merge_pdfs(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart, &state.config.pdf_uploads, MERGE_FILES_FIELD).await?;
    if form.files.len() < 2 {
        return Err(ServerError::MissingInput(
            "Please upload at least two PDF files".into(),
        ));
    }

    let names: Vec<&str> = form.files.iter().map(|f| f.file_name.as_str()).collect();
    info!(files = ?names, "Merge request");

    let uploads = state.temp.acquire_all(form.files).await?;
    let outcome = transform(&uploads, "Failed to merge PDFs", |handles| {
        pageset_core::merge(handles)
    })
    .await;
    release_all(uploads).await;

    let merged = outcome?;
    info!(size = merged.len(), "Merged PDF created");

    attachment(merged, &merged_filename(Utc::now()), PDF_CONTENT_TYPE)
}

/// Handler: POST /split-pdf
pub async fn handle_split_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut form = UploadForm::read(multipart, &state.config.pdf_uploads, PDF_FILE_FIELD).await?;
    let file = form.single_file()?;
    info!(file = %file.file_name, "Split request");

    let filename = format!("{}_split.pdf", display_stem(&file.file_name));
    let upload = state.temp.acquire(file).await?;
    let outcome = transform(std::slice::from_ref(&upload), "Failed to split PDF", |handles| {
        pageset_core::split(&handles[0])
    })
    .await;
    upload.release().await;

    let first_half = outcome?;
    info!(size = first_half.len(), "Split PDF created");

    attachment(first_half, &filename, PDF_CONTENT_TYPE)
}

/// Handler: POST /rearrange-pdf
pub async fn handle_rearrange_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let mut form = UploadForm::read(multipart, &state.config.pdf_uploads, PDF_FILE_FIELD).await?;
    let file = form.single_file()?;
    let page_order = form
        .field(PAGE_ORDER_FIELD)
        .map(str::trim)
        .filter(|order| !order.is_empty())
        .ok_or_else(|| ServerError::MissingInput("Page order is required".into()))?
        .to_string();
    info!(file = %file.file_name, page_order = %page_order, "Rearrange request");

    let filename = format!("{}_rearranged.pdf", display_stem(&file.file_name));
    let upload = state.temp.acquire(file).await?;
    let outcome = transform(
        std::slice::from_ref(&upload),
        "Failed to rearrange PDF",
        move |handles| {
            let order = PageOrder::parse_for(&page_order, handles[0].page_count())?;
            pageset_core::rearrange(&handles[0], &order)
        },
    )
    .await;
    upload.release().await;

    let rearranged = outcome?;
    info!(size = rearranged.len(), "Rearranged PDF created");

    attachment(rearranged, &filename, PDF_CONTENT_TYPE)
}

/// Handler: POST /pdf-info
pub async fn handle_pdf_info(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PdfInfo>, ServerError> {
    let mut form = UploadForm::read(multipart, &state.config.pdf_uploads, PDF_FILE_FIELD).await?;
    let file = form.single_file()?;

    let info = tokio::task::spawn_blocking(move || pageset_core::pdf_info(&file.bytes))
        .await
        .map_err(|e| ServerError::Internal(format!("PDF info task failed: {}", e)))?
        .map_err(|e| ServerError::from_core("Failed to read PDF", e))?;

    Ok(Json(info))
}

/// Load every temp upload and run `op` on the blocking pool
async fn transform<F>(
    uploads: &[TempUpload],
    context: &'static str,
    op: F,
) -> Result<Vec<u8>, ServerError>
where
    F: FnOnce(&[PdfHandle]) -> Result<Vec<u8>, PageSetError> + Send + 'static,
{
    let mut inputs = Vec::with_capacity(uploads.len());
    for upload in uploads {
        inputs.push(tokio::fs::read(upload.path()).await?);
    }

    tokio::task::spawn_blocking(move || {
        let handles = inputs
            .iter()
            .map(|bytes| PdfHandle::from_bytes(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, handle) in handles.iter().enumerate() {
            debug!(input = i, pages = handle.page_count(), "Loaded PDF");
        }
        op(&handles)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("{} task failed: {}", context, e)))?
    .map_err(|e| ServerError::from_core(context, e))
}
