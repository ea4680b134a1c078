// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage in a single embedded redb file under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   tipjar.redb     # content, likes, comments, nonces + indexes
//! ```
//!
//! Writers are serialized by redb; readers get MVCC snapshots. Multi-step
//! invariants (like uniqueness, content existence on like/comment, nonce
//! compare-and-delete) are enforced inside a single write transaction.

pub mod count_cache;
pub mod database;
pub mod repository;

pub use count_cache::LikeCountCache;
pub use database::{Database, DbError, DbResult};
pub use repository::{
    CommentPage, CommentRepository, ContentFilter, ContentPage, ContentRepository, LikeRepository,
    NonceRepository,
};
