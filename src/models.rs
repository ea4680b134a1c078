// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the stored records and the request and response
//! structures used by the REST API. All types derive `Serialize`,
//! `Deserialize`, and `ToSchema` for JSON handling and OpenAPI documentation.
//! Field names are camelCase on the wire.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters) and always holds the lowercase form, so equality is
//! case-insensitive by construction.
//!
//! ## Model Categories
//!
//! - **Content**: creator uploads, listed newest first
//! - **Likes**: one per (content, address) pair
//! - **Comments**: soft-deletable text attached to content
//! - **Auth**: nonce challenge and session token exchange
//! - **Tip Jars**: read-only views of on-chain tip jars

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::blockchain::{TipJarInfo, TipRecord};
use crate::validators::{is_valid_address, normalize_address};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Lowercase Ethereum-compatible wallet address.
///
/// Format: `0x` followed by 40 lowercase hexadecimal characters (20 bytes).
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
/// assert_eq!(addr.as_str(), "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and canonicalize an address. Returns `None` if the input is
    /// not a well-formed address.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if is_valid_address(trimmed) {
            Some(WalletAddress(normalize_address(trimmed)))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Category
// =============================================================================

/// Content category. Stored and serialized lowercase; parsed
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Music,
    Podcast,
    Article,
    Video,
    Art,
    Motivation,
    Business,
    Education,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Music,
        Category::Podcast,
        Category::Article,
        Category::Video,
        Category::Art,
        Category::Motivation,
        Category::Business,
        Category::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Podcast => "podcast",
            Category::Article => "article",
            Category::Video => "video",
            Category::Art => "art",
            Category::Motivation => "motivation",
            Category::Business => "business",
            Category::Education => "education",
        }
    }

    /// Parse a category name (case-insensitive, surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Category> {
        let wanted = raw.trim().to_lowercase();
        Category::ALL.into_iter().find(|c| c.as_str() == wanted)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stored Records
// =============================================================================

/// A piece of creator content.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Store-assigned identifier (UUID).
    pub id: String,
    /// Creator wallet address (lowercase).
    pub creator_address: WalletAddress,
    pub category: Category,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub creator_address: WalletAddress,
    pub category: Category,
    pub title: String,
    pub description: Option<String>,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
}

/// A like of one piece of content by one address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub content_id: String,
    pub address: WalletAddress,
    pub created_at: DateTime<Utc>,
}

/// A comment on a piece of content.
///
/// Deleted comments stay in the store with `deleted = true` and are never
/// returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content_id: String,
    /// Author wallet address (lowercase).
    pub address: WalletAddress,
    pub text: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination block attached to every list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    /// `ceil(total / limit)`
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit_wide = u64::from(limit.max(1));
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit_wide),
        }
    }
}

/// Query parameters accepted by paginated list endpoints.
///
/// Values are kept as raw strings so malformed numbers produce field-level
/// validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1.
    pub page: Option<String>,
    /// Items per page (capped at 100).
    pub limit: Option<String>,
}

/// Query parameters for `GET /content`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContentListQuery {
    /// Page number, starting at 1.
    pub page: Option<String>,
    /// Items per page (capped at 100).
    pub limit: Option<String>,
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by creator address.
    pub creator: Option<String>,
}

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NonceRequest {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NonceResponse {
    pub nonce: String,
    /// The exact message the wallet must sign.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyRequest {
    #[serde(default)]
    pub address: Option<String>,
    /// 65-byte hex signature (`0x`-prefixed) over the challenge message.
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Bearer session token.
    pub token: String,
    pub address: WalletAddress,
}

// =============================================================================
// Content Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentListResponse {
    pub content: Vec<Content>,
    pub pagination: Pagination,
}

// =============================================================================
// Like Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    #[serde(default)]
    pub content_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ToggleLikeResponse {
    /// Like state after the toggle.
    pub liked: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountResponse {
    pub content_id: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub content_id: String,
    pub liked: bool,
}

// =============================================================================
// Comment Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Media Models
// =============================================================================

/// Result of a successful file upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UploadResponse {
    /// Generated filename on disk.
    pub filename: String,
    /// Public URL the file is served from.
    pub url: String,
    pub mimetype: String,
    /// Size in bytes.
    pub size: u64,
}

// =============================================================================
// Tip Jar Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipJarListResponse {
    /// Every tip jar registered with the factory.
    pub tip_jars: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipJarStatusResponse {
    pub creator: WalletAddress,
    pub has_tip_jar: bool,
    pub tip_jar: Option<TipJarInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipHistoryResponse {
    pub creator: WalletAddress,
    /// Tip jar contract address.
    pub tip_jar: String,
    pub tips: Vec<TipRecord>,
}
