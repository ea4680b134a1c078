// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Media Storage
//!
//! Uploaded files live flat under `UPLOAD_DIR` and are served statically at
//! `/uploads/{filename}`.
//!
//! | Kind | Limit | Accepted types |
//! |------|-------|----------------|
//! | [`UploadKind::Media`] | `MAX_FILE_SIZE` | [`ALLOWED_MEDIA_TYPES`] |
//! | [`UploadKind::Thumbnail`] | `MAX_THUMBNAIL_SIZE` | `image/*` |
//!
//! Files are streamed to disk chunk by chunk. The type check happens before
//! any file is created; a file that grows past its limit is removed.

use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Category, UploadResponse};

/// MIME types accepted for content media.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "application/pdf",
    "text/plain",
];

/// Public URL prefix of uploaded files.
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File type {0} not allowed")]
    UnsupportedType(String),

    #[error("Only image files allowed for thumbnails")]
    NotAnImage(String),

    /// `limit` is unknown when the request body limit tripped first.
    #[error("File too large")]
    TooLarge { limit: Option<u64> },

    #[error("invalid multipart body: {0}")]
    Multipart(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MultipartError> for MediaError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            MediaError::TooLarge { limit: None }
        } else {
            MediaError::Multipart(e.body_text())
        }
    }
}

/// What an upload is for; selects the size limit and type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Media,
    Thumbnail,
}

/// MIME prefixes that suit content of `category`.
pub fn allowed_mime_prefixes(category: Category) -> &'static [&'static str] {
    match category {
        Category::Music | Category::Podcast => &["audio/"],
        Category::Video => &["video/"],
        Category::Art => &["image/"],
        Category::Article => &["application/pdf", "text/"],
        Category::Motivation => &["audio/", "video/", "image/", "text/"],
        Category::Business => &["application/pdf", "text/", "video/"],
        Category::Education => &["video/", "audio/", "application/pdf", "text/"],
    }
}

pub fn is_valid_file_type(mime: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| mime.starts_with(prefix))
}

/// Public URL of a stored file.
pub fn file_url(filename: &str) -> String {
    format!("{UPLOADS_ROUTE}/{filename}")
}

/// `{unix_millis}-{32 hex}{.ext}`, keeping a sane extension of `original`.
pub fn generate_filename(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}

/// Upload directory handling and file persistence.
#[derive(Debug, Clone)]
pub struct MediaService {
    upload_dir: PathBuf,
    max_file_size: u64,
    max_thumbnail_size: u64,
}

impl MediaService {
    pub fn new(upload_dir: impl Into<PathBuf>, max_file_size: u64, max_thumbnail_size: u64) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_file_size,
            max_thumbnail_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.upload_dir.clone(),
            config.max_file_size,
            config.max_thumbnail_size,
        )
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn limit(&self, kind: UploadKind) -> u64 {
        match kind {
            UploadKind::Media => self.max_file_size,
            UploadKind::Thumbnail => self.max_thumbnail_size,
        }
    }

    /// Create the upload directory (and parents) if missing.
    pub async fn ensure_upload_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await
    }

    /// Check a declared MIME type against the filter for `kind`.
    pub fn check_type(&self, kind: UploadKind, mime: &str) -> Result<(), MediaError> {
        match kind {
            UploadKind::Media if ALLOWED_MEDIA_TYPES.contains(&mime) => Ok(()),
            UploadKind::Media => Err(MediaError::UnsupportedType(mime.to_string())),
            UploadKind::Thumbnail if mime.starts_with("image/") => Ok(()),
            UploadKind::Thumbnail => Err(MediaError::NotAnImage(mime.to_string())),
        }
    }

    /// Stream one multipart field to disk.
    pub async fn save_upload(&self, kind: UploadKind, mut field: Field<'_>) -> Result<UploadResponse, MediaError> {
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        self.check_type(kind, &mime)?;

        let filename = generate_filename(field.file_name().unwrap_or_default());
        let path = self.upload_dir.join(&filename);
        let limit = self.limit(kind);

        let mut file = tokio::fs::File::create(&path).await?;
        let mut size = 0u64;
        let written: Result<(), MediaError> = async {
            while let Some(chunk) = field.chunk().await? {
                size += chunk.len() as u64;
                if size > limit {
                    return Err(MediaError::TooLarge { limit: Some(limit) });
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(file = %path.display(), error = %remove_err, "Failed to remove partial upload");
            }
            return Err(e);
        }

        tracing::info!(filename = %filename, mimetype = %mime, size, "File uploaded");
        Ok(UploadResponse {
            url: file_url(&filename),
            filename,
            mimetype: mime,
            size,
        })
    }

    /// Remove a stored file. Failures are logged, never returned.
    pub async fn delete_file(&self, filename: &str) {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
            tracing::warn!(filename, "Refusing to delete suspicious filename");
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.upload_dir.join(filename)).await {
            tracing::warn!(filename, error = %e, "Failed to delete file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_shape() {
        let name = generate_filename("holiday photo.JPG");
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), 32 + ".JPG".len());
        assert!(rest[..32].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(name.ends_with(".JPG"));
        assert_ne!(generate_filename("a.png"), generate_filename("a.png"));
    }

    #[test]
    fn filename_drops_odd_extensions() {
        assert!(!generate_filename("noext").contains('.'));
        assert!(!generate_filename("../../etc/passwd").contains('/'));
        assert!(!generate_filename("x.p$p").contains('$'));
    }

    #[test]
    fn file_url_is_under_uploads() {
        assert_eq!(file_url("a.png"), "/uploads/a.png");
    }

    #[test]
    fn category_prefixes() {
        assert!(is_valid_file_type("audio/mpeg", allowed_mime_prefixes(Category::Music)));
        assert!(!is_valid_file_type("video/mp4", allowed_mime_prefixes(Category::Podcast)));
        assert!(is_valid_file_type("application/pdf", allowed_mime_prefixes(Category::Article)));
        assert!(is_valid_file_type("text/plain", allowed_mime_prefixes(Category::Education)));
        assert!(!is_valid_file_type("image/png", allowed_mime_prefixes(Category::Business)));
    }

    #[test]
    fn type_filters_per_kind() {
        let media = MediaService::new("uploads", 10, 10);
        assert!(media.check_type(UploadKind::Media, "image/png").is_ok());
        assert!(matches!(
            media.check_type(UploadKind::Media, "application/x-msdownload"),
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(media.check_type(UploadKind::Thumbnail, "image/svg+xml").is_ok());
        assert!(matches!(
            media.check_type(UploadKind::Thumbnail, "video/mp4"),
            Err(MediaError::NotAnImage(_))
        ));
    }

    #[tokio::test]
    async fn ensure_upload_dir_is_recursive_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaService::new(dir.path().join("a/b/uploads"), 10, 10);
        media.ensure_upload_dir().await.unwrap();
        media.ensure_upload_dir().await.unwrap();
        assert!(media.upload_dir().is_dir());
    }

    #[tokio::test]
    async fn delete_file_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaService::new(dir.path(), 10, 10);
        let path = dir.path().join("x.txt");
        tokio::fs::write(&path, b"hi").await.unwrap();

        media.delete_file("x.txt").await;
        assert!(!path.exists());
        // Missing and traversal names are ignored.
        media.delete_file("x.txt").await;
        media.delete_file("../x.txt").await;
    }
}
