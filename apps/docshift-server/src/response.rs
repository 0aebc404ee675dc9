//! Attachment responses for transform outputs

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::error::ServerError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Wrap `bytes` as a download.
///
/// `Content-Length` is set to the exact buffer length; outputs are only known
/// once the transform finishes and clients truncate downloads without it.
/// Non-ASCII names get an RFC 5987 `filename*` next to the ASCII fallback.
pub fn attachment(
    bytes: Vec<u8>,
    filename: &str,
    content_type: &str,
) -> Result<Response, ServerError> {
    let length = bytes.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(filename))
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from(bytes))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

/// `merged_<YYYY-MM-DD>.pdf`
pub fn merged_filename(now: DateTime<Utc>) -> String {
    format!("merged_{}.pdf", now.format("%Y-%m-%d"))
}

fn content_disposition(filename: &str) -> String {
    let fallback = header_safe(filename);
    if filename.is_ascii() && !filename.chars().any(|c| c.is_ascii_control()) {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    }
}

/// Replace anything that cannot sit inside a quoted header parameter
fn header_safe(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    if cleaned.trim().is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}
