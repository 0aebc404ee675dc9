//! docshift server binary

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use docshift_server::{build_router, AppState, Config, UploadPolicy};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the docshift server
#[derive(Parser, Debug)]
#[command(name = "docshift-server")]
#[command(about = "PDF merge, split and rearrange over HTTP uploads")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DOCSHIFT_PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "DOCSHIFT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Directory for request-scoped temp uploads
    #[arg(long, env = "DOCSHIFT_TEMP_DIR", default_value = "uploads")]
    temp_dir: PathBuf,

    /// Per-file size limit for PDF uploads, in bytes
    #[arg(long, env = "DOCSHIFT_MAX_PDF_BYTES", default_value_t = docshift_server::config::DEFAULT_MAX_PDF_BYTES)]
    max_pdf_bytes: usize,

    /// Maximum number of files accepted by /merge-pdfs
    #[arg(long, env = "DOCSHIFT_MAX_MERGE_FILES", default_value_t = docshift_server::config::DEFAULT_MAX_MERGE_FILES)]
    max_merge_files: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config {
        temp_dir: args.temp_dir,
        pdf_uploads: UploadPolicy::pdf(args.max_pdf_bytes, args.max_merge_files),
    };
    info!("Temp uploads: {}", config.temp_dir.display());
    info!(
        "PDF uploads: {} bytes per file, {} files per merge",
        config.pdf_uploads.max_file_bytes, config.pdf_uploads.max_files
    );

    let state = AppState::new(config)?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
