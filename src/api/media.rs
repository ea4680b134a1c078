// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    media::{MediaError, UploadKind},
    models::UploadResponse,
    state::AppState,
};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

async fn store_file_field(
    state: &AppState,
    kind: UploadKind,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let saved = state.media.save_upload(kind, field).await?;
            return Ok((StatusCode::CREATED, Json(saved)));
        }
    }
    Err(MediaError::MissingFile.into())
}

/// Upload a media file for later use as a content `mediaUrl`.
#[utoipa::path(
    post,
    path = "/api/media/upload",
    tag = "Media",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 201, body = UploadResponse),
        (status = 400, description = "Missing file, disallowed type, or file too large")
    )
)]
pub async fn upload_media(
    State(state): State<AppState>,
    Auth(user): Auth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    tracing::debug!(address = %user.address, "Media upload started");
    store_file_field(&state, UploadKind::Media, multipart?).await
}

/// Upload a thumbnail image.
#[utoipa::path(
    post,
    path = "/api/media/thumbnail",
    tag = "Media",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data", description = "Multipart form with a `file` image field"),
    responses(
        (status = 201, body = UploadResponse),
        (status = 400, description = "Missing file, not an image, or file too large")
    )
)]
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Auth(user): Auth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    tracing::debug!(address = %user.address, "Thumbnail upload started");
    store_file_field(&state, UploadKind::Thumbnail, multipart?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{bearer, ALICE};
    use crate::state::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-TEST-BOUNDARY";

    fn multipart_request(path: &str, token: &str, field: &str, mime: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"clip.bin\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn upload_stores_file() {
        let (state, _dir) = test_state();
        let token = bearer(&state, ALICE);
        let upload_dir = state.media.upload_dir().to_path_buf();

        let response = router(state)
            .oneshot(multipart_request("/api/media/upload", &token, "file", "audio/mpeg", b"ID3 data"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        let filename = body["filename"].as_str().unwrap();
        assert!(filename.ends_with(".bin"));
        assert_eq!(body["url"], format!("/uploads/{filename}"));
        assert_eq!(body["mimetype"], "audio/mpeg");
        assert_eq!(body["size"], 8);
        assert_eq!(std::fs::read(upload_dir.join(filename)).unwrap(), b"ID3 data");
    }

    #[tokio::test]
    async fn disallowed_type_writes_nothing() {
        let (state, _dir) = test_state();
        let token = bearer(&state, ALICE);
        let upload_dir = state.media.upload_dir().to_path_buf();

        let response = router(state)
            .oneshot(multipart_request(
                "/api/media/upload",
                &token,
                "file",
                "application/x-msdownload",
                b"MZ",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "File type application/x-msdownload not allowed");
        assert_eq!(std::fs::read_dir(upload_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn oversized_file_is_removed() {
        let (state, _dir) = test_state();
        let token = bearer(&state, ALICE);
        let upload_dir = state.media.upload_dir().to_path_buf();
        let data = vec![0u8; 300];

        // Thumbnail limit in the test state is 256 bytes.
        let response = router(state)
            .oneshot(multipart_request("/api/media/thumbnail", &token, "file", "image/png", &data))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "File too large");
        assert_eq!(std::fs::read_dir(upload_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn thumbnail_requires_image() {
        let (state, _dir) = test_state();
        let token = bearer(&state, ALICE);

        let response = router(state)
            .oneshot(multipart_request("/api/media/thumbnail", &token, "file", "video/mp4", b"x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Only image files allowed for thumbnails");
    }

    #[tokio::test]
    async fn missing_file_field() {
        let (state, _dir) = test_state();
        let token = bearer(&state, ALICE);

        let response = router(state)
            .oneshot(multipart_request("/api/media/upload", &token, "attachment", "text/plain", b"x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn upload_requires_auth() {
        let (state, _dir) = test_state();
        let mut request = multipart_request("/api/media/upload", "x", "file", "text/plain", b"x");
        request.headers_mut().remove(header::AUTHORIZATION);

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
