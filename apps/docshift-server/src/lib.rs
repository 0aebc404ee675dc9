//! docshift server
//!
//! HTTP front end for the PDF page-set transforms in `pageset-core`:
//!
//! - `POST /merge-pdfs` - concatenate 2..10 uploaded PDFs
//! - `POST /split-pdf` - keep the first half of an uploaded PDF
//! - `POST /rearrange-pdf` - permute pages by a `pageOrder` string
//! - `POST /pdf-info` - page count and metadata for the page grid
//! - `GET /health`
//!
//! Uploads are persisted as request-scoped temp files under the configured
//! directory and removed on every exit path.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod response;
pub mod uploads;

pub use config::{Config, UploadPolicy};
pub use error::ServerError;
pub use uploads::TempStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub temp: TempStore,
}

impl AppState {
    /// Build state from configuration, creating the temp directory if needed
    pub fn new(config: Config) -> std::io::Result<Self> {
        let temp = TempStore::new(&config.temp_dir)?;
        Ok(Self {
            config: Arc::new(config),
            temp,
        })
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.pdf_uploads.body_limit();

    Router::new()
        // Health check
        .route("/health", get(api::handle_health))
        // Page-set endpoints
        .route("/merge-pdfs", post(api::handle_merge_pdfs))
        .route("/split-pdf", post(api::handle_split_pdf))
        .route("/rearrange-pdf", post(api::handle_rearrange_pdf))
        .route("/pdf-info", post(api::handle_pdf_info))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
