// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Library
//!
//! Typed access to the REST API and the tip jar contracts for wallets,
//! bots and tests.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ApiClient`] | HTTP calls, bearer token held in-process |
//! | [`WalletSession`] | Nonce, sign, verify login with a local key |
//! | [`TipSender`] | Send ether tips straight to a creator's tip jar |
//!
//! ```rust,ignore
//! let mut session = WalletSession::new(ApiClient::new("http://localhost:5000/api")?);
//! session.login(&signer).await?;
//! session.client().toggle_like(&content_id).await?;
//! ```

pub mod api;
pub mod session;
pub mod tips;

pub use api::{ApiClient, ContentParams, PageParams};
pub use session::WalletSession;
pub use tips::TipSender;

use crate::blockchain::BlockchainError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response; `message` is the server's `error` field.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

impl ClientError {
    /// HTTP status of an API error response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
