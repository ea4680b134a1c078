// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository provides the operations for one entity type on top of
//! the shared [`Database`](super::Database).

pub mod comments;
pub mod content;
pub mod likes;
pub mod nonces;

pub use comments::{CommentPage, CommentRepository};
pub use content::{ContentFilter, ContentPage, ContentRepository};
pub use likes::LikeRepository;
pub use nonces::NonceRepository;
