// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet-signature login with HS256 session tokens.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/auth/nonce` mints a single-use nonce (5 minute TTL)
//! 2. The wallet signs the challenge message (EIP-191 `personal_sign`)
//! 3. `POST /api/auth/verify` recovers the signer, consumes the nonce and
//!    returns a session token
//! 4. Later requests send `Authorization: Bearer <token>`
//!
//! ## Security
//!
//! - Nonces are consumed with a compare-and-delete, so a signature can be
//!   exchanged for a token only once
//! - Tokens carry `address`, `iat` and `exp`; no clock leeway is applied

pub mod error;
pub mod extractor;
pub mod nonce;
pub mod service;
pub mod signature;
pub mod token;

pub use error::AuthError;
pub use extractor::{Auth, AuthenticatedUser};
pub use nonce::{MemoryNonceStore, NonceReaper, NonceRecord, NonceStore, NonceStoreError};
pub use service::AuthService;
pub use signature::verify_signature;
pub use token::{SessionClaims, TokenIssuer};
