//! Upload intake and temp-file lifecycle
//!
//! Multipart bodies are read into memory under an [`UploadPolicy`], then each
//! accepted file is persisted by the [`TempStore`] as a [`TempUpload`]. A temp
//! upload is removed exactly once: by [`TempUpload::release`] on the normal
//! path, or by its `Drop` if the handler bails out before releasing.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::UploadPolicy;
use crate::error::ServerError;

/// One file part accepted from a multipart body
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Parsed multipart form: file parts plus plain text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<Upload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Read every part of `multipart`, accepting files only under `file_field`
    pub async fn read(
        mut multipart: Multipart,
        policy: &UploadPolicy,
        file_field: &str,
    ) -> Result<Self, ServerError> {
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await?;
                form.fields.insert(name, value);
                continue;
            };

            if name != file_field {
                return Err(ServerError::UploadRejected(format!(
                    "Unexpected file field '{}'",
                    name
                )));
            }
            if form.files.len() >= policy.max_files {
                return Err(ServerError::UploadRejected(format!(
                    "Too many files (at most {} allowed)",
                    policy.max_files
                )));
            }

            let content_type = field.content_type().unwrap_or_default().to_string();
            if !policy.allows(&content_type) {
                return Err(ServerError::UploadRejected(
                    policy.rejection_message.to_string(),
                ));
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.chunk().await? {
                if bytes.len() + chunk.len() > policy.max_file_bytes {
                    return Err(ServerError::UploadRejected(format!(
                        "File '{}' exceeds the {} byte limit",
                        file_name, policy.max_file_bytes
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }

            form.files.push(Upload {
                file_name,
                content_type,
                bytes,
            });
        }

        Ok(form)
    }

    /// Value of a text field, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take the single expected file, or fail with "No file uploaded"
    pub fn single_file(&mut self) -> Result<Upload, ServerError> {
        match self.files.len() {
            0 => Err(ServerError::MissingInput("No file uploaded".into())),
            1 => Ok(self.files.remove(0)),
            n => Err(ServerError::UploadRejected(format!(
                "Expected one file, got {}",
                n
            ))),
        }
    }
}

/// Request-scoped upload persisted on local storage
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    original_name: String,
    size: u64,
    content_type: String,
    released: bool,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Delete the backing file. A file that is already gone is not an error.
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "temp upload deleted"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to delete temp upload"),
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Release every upload in order
pub async fn release_all(uploads: Vec<TempUpload>) {
    for upload in uploads {
        upload.release().await;
    }
}

/// Owner of the temp upload directory
#[derive(Debug, Clone)]
pub struct TempStore {
    root: PathBuf,
}

impl TempStore {
    /// Use `root` for temp uploads, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one upload under a store-generated unique name
    pub async fn acquire(&self, upload: Upload) -> Result<TempUpload, ServerError> {
        let path = self.root.join(temp_file_name(&upload.file_name));

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(&upload.bytes).await?;
            file.flush().await
        }
        .await;
        drop(file);

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ServerError::Io(e));
        }

        debug!(path = %path.display(), size = upload.bytes.len(), "temp upload written");

        Ok(TempUpload {
            path,
            original_name: upload.file_name,
            size: upload.bytes.len() as u64,
            content_type: upload.content_type,
            released: false,
        })
    }

    /// Persist uploads in order; on failure, already persisted ones are released
    pub async fn acquire_all(&self, uploads: Vec<Upload>) -> Result<Vec<TempUpload>, ServerError> {
        let mut acquired = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.acquire(upload).await {
                Ok(temp) => acquired.push(temp),
                Err(e) => {
                    release_all(acquired).await;
                    return Err(e);
                }
            }
        }
        Ok(acquired)
    }
}

/// `<stem>_<unix millis>_<8 hex>.<ext>`; stem and extension are reduced to
/// filesystem-safe characters
fn temp_file_name(original: &str) -> String {
    let original = Path::new(original);

    let stem: String = original
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };

    let ext: String = original
        .extension()
        .map(|e| e.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect();

    let suffix = Uuid::new_v4().simple().to_string();
    let millis = Utc::now().timestamp_millis();

    if ext.is_empty() {
        format!("{}_{}_{}", stem, millis, &suffix[..8])
    } else {
        format!("{}_{}_{}.{}", stem, millis, &suffix[..8], ext)
    }
}

/// File stem of an uploaded name, for building download names
pub fn display_stem(original: &str) -> String {
    Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}
