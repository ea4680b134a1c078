// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Login Handshake
//!
//! 1. Client requests a nonce for its address; the server mints and stores it.
//! 2. Client signs `"Sign this message to authenticate: {nonce}"` with its
//!    wallet key (EIP-191).
//! 3. Client submits address + signature; the server rebuilds the message
//!    from the stored nonce, recovers the signer, consumes the nonce and
//!    issues a session token.
//!
//! A missing or expired nonce ends the attempt; the client restarts at step 1.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};

use super::nonce::{NonceRecord, NonceStore, NonceStoreError};
use super::signature;
use super::token::{SessionClaims, TokenIssuer};
use super::AuthError;
use crate::models::WalletAddress;

/// Lifetime of an issued nonce.
pub const NONCE_TTL: Duration = Duration::from_secs(5 * 60);

/// Prefix of the message a wallet signs to log in.
pub const CHALLENGE_PREFIX: &str = "Sign this message to authenticate: ";

impl From<NonceStoreError> for AuthError {
    fn from(e: NonceStoreError) -> Self {
        AuthError::InternalError(e.to_string())
    }
}

#[derive(Clone)]
pub struct AuthService {
    nonces: Arc<dyn NonceStore>,
    tokens: TokenIssuer,
    rng: SystemRandom,
    nonce_ttl: Duration,
}

impl AuthService {
    pub fn new(nonces: Arc<dyn NonceStore>, tokens: TokenIssuer) -> Self {
        Self {
            nonces,
            tokens,
            rng: SystemRandom::new(),
            nonce_ttl: NONCE_TTL,
        }
    }

    pub fn with_nonce_ttl(mut self, ttl: Duration) -> Self {
        self.nonce_ttl = ttl;
        self
    }

    pub fn nonce_store(&self) -> Arc<dyn NonceStore> {
        self.nonces.clone()
    }

    /// The exact message a wallet must sign for `nonce`.
    pub fn challenge_message(nonce: &str) -> String {
        format!("{CHALLENGE_PREFIX}{nonce}")
    }

    /// Mint a 32-byte hex nonce for `address`, replacing any previous one.
    pub fn generate_nonce(&self, address: &WalletAddress) -> Result<String, AuthError> {
        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AuthError::InternalError("random source unavailable".to_string()))?;
        let nonce = alloy::hex::encode(bytes);

        let ttl = chrono::Duration::from_std(self.nonce_ttl)
            .map_err(|e| AuthError::InternalError(format!("invalid nonce ttl: {e}")))?;
        self.nonces.put(
            address.as_str(),
            NonceRecord {
                nonce: nonce.clone(),
                expires_at: Utc::now() + ttl,
            },
        )?;

        tracing::debug!(address = %address, "Nonce issued");
        Ok(nonce)
    }

    /// Live nonce for `address`, if any.
    pub fn get_nonce(&self, address: &WalletAddress) -> Result<Option<String>, AuthError> {
        Ok(self
            .nonces
            .get(address.as_str(), Utc::now())?
            .map(|record| record.nonce))
    }

    pub fn delete_nonce(&self, address: &WalletAddress) -> Result<(), AuthError> {
        self.nonces.remove(address.as_str())?;
        Ok(())
    }

    /// Remove the nonce only if `address` still holds `nonce`.
    pub fn consume_nonce(&self, address: &WalletAddress, nonce: &str) -> Result<bool, AuthError> {
        Ok(self.nonces.consume(address.as_str(), nonce, Utc::now())?)
    }

    pub fn verify_signature(&self, address: &WalletAddress, message: &str, signature: &str) -> bool {
        signature::verify_signature(address.as_str(), message, signature)
    }

    pub fn generate_token(&self, address: &WalletAddress) -> Result<String, AuthError> {
        self.tokens.issue(address.as_str())
    }

    pub fn verify_token(&self, token: &str) -> Option<SessionClaims> {
        self.tokens.verify(token)
    }

    pub fn decode_token(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.tokens.decode(token)
    }

    /// Step 3 of the handshake: check the signature over the stored nonce
    /// and exchange it for a session token.
    pub fn authenticate(&self, address: &WalletAddress, signature: &str) -> Result<String, AuthError> {
        let nonce = self.get_nonce(address)?.ok_or(AuthError::NonceNotFound)?;
        let message = Self::challenge_message(&nonce);

        if !self.verify_signature(address, &message, signature) {
            tracing::info!(address = %address, "Signature verification failed");
            return Err(AuthError::SignatureMismatch);
        }

        // A concurrent verify with the same nonce may have won the race.
        if !self.consume_nonce(address, &nonce)? {
            return Err(AuthError::NonceNotFound);
        }

        let token = self.generate_token(address)?;
        tracing::info!(address = %address, "Wallet authenticated");
        Ok(token)
    }
}
