// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::ApiJson;
use crate::{
    auth::AuthService,
    error::ApiError,
    models::{NonceRequest, NonceResponse, VerifyRequest, VerifyResponse},
    state::AppState,
    validators::{require_address, require_text},
};

/// Issue a login nonce for a wallet address.
///
/// Any earlier nonce for the same address is replaced.
#[utoipa::path(
    post,
    path = "/api/auth/nonce",
    request_body = NonceRequest,
    tag = "Auth",
    responses(
        (status = 200, body = NonceResponse),
        (status = 400, description = "Missing or invalid address")
    )
)]
pub async fn request_nonce(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NonceRequest>,
) -> Result<Json<NonceResponse>, ApiError> {
    let address = require_address("address", request.address.as_deref())?;
    let nonce = state.auth.generate_nonce(&address)?;
    tracing::debug!(address = %address, "Issued login nonce");

    Ok(Json(NonceResponse {
        message: AuthService::challenge_message(&nonce),
        nonce,
    }))
}

/// Exchange a signed challenge for a session token.
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    tag = "Auth",
    responses(
        (status = 200, body = VerifyResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Nonce expired or signature mismatch")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let address = require_address("address", request.address.as_deref());
    let signature = require_text("signature", request.signature.as_deref(), "Signature is required");
    let (address, signature) = match (address, signature) {
        (Ok(address), Ok(signature)) => (address, signature),
        (address, signature) => {
            return Err(ApiError::validation(
                [address.err(), signature.err()].into_iter().flatten().collect(),
            ))
        }
    };

    let token = state.auth.authenticate(&address, &signature).inspect_err(|e| {
        tracing::info!(address = %address, error = %e, "Wallet authentication failed");
    })?;
    tracing::info!(address = %address, "Wallet authenticated");

    Ok(Json(VerifyResponse { token, address }))
}
