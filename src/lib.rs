// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TipJar - Creator Content Platform
//!
//! REST backend for creator content with wallet-signature login, plus
//! read-only access to on-chain tip jars and a client library for wallets.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Nonce challenge, EIP-191 verification and session tokens
//! - `blockchain` - Tip jar contract reads
//! - `client` - Typed API client, wallet login and tip sending
//! - `media` - Upload storage
//! - `storage` - Embedded redb database

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod models;
pub mod state;
pub mod storage;
pub mod validators;
