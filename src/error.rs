// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::blockchain::BlockchainError;
use crate::media::MediaError;
use crate::storage::DbError;
use crate::validators::FieldError;

/// Message returned to clients for any unclassified failure.
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<FieldError>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldError>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 400 with field-level messages.
    pub fn validation(details: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation error".to_string(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Upload exceeded its configured size limit.
    pub fn payload_too_large() -> Self {
        Self::bad_request("File too large")
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Log the cause and return a generic 500.
    pub fn internal(cause: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Unhandled error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(details: Vec<FieldError>) -> Self {
        ApiError::validation(details)
    }
}

impl From<FieldError> for ApiError {
    fn from(detail: FieldError) -> Self {
        ApiError::validation(vec![detail])
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            DbError::Conflict(_) => ApiError::conflict("Duplicate entry"),
            other => ApiError::internal(&other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let status = e.status_code();
        if status.is_server_error() {
            ApiError::internal(&e)
        } else {
            ApiError::new(status, e.to_string())
        }
    }
}

impl From<BlockchainError> for ApiError {
    fn from(e: BlockchainError) -> Self {
        // Provider errors are logged here and never echoed to the client.
        tracing::warn!(error = %e, "Blockchain read failed");
        match e {
            BlockchainError::NotConfigured => {
                ApiError::service_unavailable("Blockchain features are not configured")
            }
            BlockchainError::InvalidAddress(_) => ApiError::bad_request("Invalid address"),
            BlockchainError::Timeout => {
                ApiError::service_unavailable("Blockchain node did not respond in time")
            }
            BlockchainError::Rpc(_) | BlockchainError::InvalidRpcUrl(_) => {
                ApiError::service_unavailable("Blockchain node unavailable")
            }
            BlockchainError::Contract(_) => ApiError::bad_gateway("Failed to read tip jar contract"),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::MissingFile
            | MediaError::UnsupportedType(_)
            | MediaError::NotAnImage(_) => ApiError::bad_request(e.to_string()),
            MediaError::TooLarge { .. } => ApiError::payload_too_large(),
            MediaError::Multipart(msg) => ApiError::bad_request(format!("Invalid multipart body: {msg}")),
            MediaError::Io(err) => ApiError::internal(&err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        MediaError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let forbidden = ApiError::forbidden("nope");
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let too_large = ApiError::payload_too_large();
        assert_eq!(too_large.status, StatusCode::BAD_REQUEST);
        assert_eq!(too_large.message, "File too large");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn validation_errors_carry_details() {
        let response =
            ApiError::validation(vec![FieldError::new("title", "Title is required")]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Validation error");
        assert_eq!(body["details"][0]["field"], "title");
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let err = ApiError::from(DbError::Corrupt("bad bytes".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn blockchain_errors_do_not_leak_provider_text() {
        let err = ApiError::from(BlockchainError::Rpc("connection refused at 10.0.0.5:8545".into()));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.message.contains("10.0.0.5"));

        let err = ApiError::from(BlockchainError::Contract("execution reverted: 0x08c379a0".into()));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(!err.message.contains("reverted"));
    }

    #[test]
    fn db_conflict_maps_to_409() {
        let err = ApiError::from(DbError::Conflict("like".into()));
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
