//! Resume Handler — converts an uploaded binary into a portable base64
//! encoding and, when an object store is configured, a shareable link.
//!
//! The upload is an optional enhancement: any failure on the storage path is
//! logged and the pipeline proceeds with the inline-encoded blob only. The
//! temporary spool file is deleted on every exit path via `NamedTempFile`
//! drop semantics.

use std::io::Write;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::submission::models::ResumeBlob;

/// A file field read out of the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Object-storage handle for resume uploads, constructed once at startup.
#[derive(Clone)]
pub struct ResumeStore {
    pub s3: S3Client,
    pub bucket: String,
    /// Public base URL the bucket is reachable under, used to build the
    /// shareable link returned to downstream sinks.
    pub public_base: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("temp spool failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("object upload failed: {0}")]
    Storage(String),
}

/// Turns an uploaded file into a `ResumeBlob`. Infallible by contract: the
/// encoding is computed in memory, and upload failures are recovered here.
pub async fn process_upload(store: Option<&ResumeStore>, file: UploadedFile) -> ResumeBlob {
    let mut blob = ResumeBlob::new(file.filename, file.bytes);

    if let Some(store) = store {
        match upload_to_store(store, &blob).await {
            Ok(link) => {
                info!("uploaded resume '{}' to object storage", blob.filename);
                blob.external_link = Some(link);
            }
            Err(e) => {
                warn!(
                    "resume upload failed for '{}', continuing without link: {e}",
                    blob.filename
                );
            }
        }
    }

    blob
}

/// Spools the bytes to a temp file and uploads them, returning the shareable
/// link. The temp file lives only within this call.
async fn upload_to_store(store: &ResumeStore, blob: &ResumeBlob) -> Result<String, UploadError> {
    let mut spool = NamedTempFile::new()?;
    spool.write_all(&blob.bytes)?;
    spool.flush()?;

    let key = format!("resumes/{}/{}", Uuid::new_v4(), blob.filename);
    let body = ByteStream::from_path(spool.path())
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?;

    store
        .s3
        .put_object()
        .bucket(&store.bucket)
        .key(&key)
        .body(body)
        .content_type(content_type_for(&blob.filename))
        .send()
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?;

    Ok(format!("{}/{}/{}", store.public_base, store.bucket, key))
}

/// Content type from the filename extension. Resumes are overwhelmingly PDF
/// or Word documents; anything else is treated as an opaque binary.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_store_yields_encoded_blob_without_link() {
        let file = UploadedFile {
            filename: "cv.pdf".into(),
            bytes: b"%PDF-1.4 fake".to_vec(),
        };

        let blob = process_upload(None, file).await;

        assert_eq!(blob.filename, "cv.pdf");
        assert!(!blob.encoded.is_empty());
        assert!(blob.external_link.is_none());
    }

    #[tokio::test]
    async fn test_empty_file_is_handled() {
        let file = UploadedFile {
            filename: "empty.pdf".into(),
            bytes: Vec::new(),
        };

        let blob = process_upload(None, file).await;

        assert_eq!(blob.encoded, "");
        assert!(blob.external_link.is_none());
    }

    #[test]
    fn test_content_type_for_known_extensions() {
        assert_eq!(content_type_for("cv.pdf"), "application/pdf");
        assert_eq!(content_type_for("cv.PDF"), "application/pdf");
        assert_eq!(content_type_for("cv.doc"), "application/msword");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("mystery"), "application/octet-stream");
    }
}
