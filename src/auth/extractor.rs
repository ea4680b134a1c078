// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.address is the lowercase wallet address
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;
use crate::models::WalletAddress;
use crate::state::AppState;

/// Identity established by a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub address: WalletAddress,
    /// Token expiry (unix seconds)
    pub expires_at: i64,
}

/// Extractor for authenticated users.
///
/// Validates `Authorization: Bearer <token>` against the server's session
/// token secret.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = state.auth.decode_token(token)?;
        let address = WalletAddress::parse(&claims.address).ok_or(AuthError::MalformedToken)?;

        Ok(Auth(AuthenticatedUser {
            address,
            expires_at: claims.exp,
        }))
    }
}
