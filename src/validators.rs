// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request validation helpers.
//!
//! Pure functions shared by the route layer: address checks, string
//! sanitation, pagination parsing and body validation that reports
//! field-level messages.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

use crate::models::{
    Category, CreateCommentRequest, CreateContentRequest, NewContent, WalletAddress,
};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MAX_COMMENT_LEN: usize = 1000;
pub const MAX_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_CONTENT_LIMIT: u32 = 20;
pub const DEFAULT_COMMENT_LIMIT: u32 = 50;

/// A single failed field check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check whether a string is a well-formed EVM address.
///
/// All-lowercase and all-uppercase hex bodies are accepted as is. Mixed-case
/// input must carry a valid EIP-55 checksum.
pub fn is_valid_address(raw: &str) -> bool {
    let Some(body) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) else {
        return false;
    };
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{body}"), None).is_ok()
    } else {
        true
    }
}

pub fn normalize_address(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// NFC-normalize, trim and clamp a string to `max_len` characters.
pub fn sanitize_string(raw: &str, max_len: usize) -> String {
    let normalized: String = raw.nfc().collect();
    normalized.trim().chars().take(max_len).collect()
}

/// Parsed `page`/`limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Parse raw query values. Non-integers and values below 1 are errors;
    /// limits above [`MAX_PAGE_LIMIT`] are capped.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
    ) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let page = match parse_positive(page) {
            Ok(value) => value.unwrap_or(1),
            Err(()) => {
                errors.push(FieldError::new("page", "Invalid page"));
                1
            }
        };
        let limit = match parse_positive(limit) {
            Ok(value) => value.unwrap_or(default_limit),
            Err(()) => {
                errors.push(FieldError::new("limit", "Invalid limit"));
                default_limit
            }
        };

        if errors.is_empty() {
            Ok(Self::new(page, limit))
        } else {
            Err(errors)
        }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

fn parse_positive(raw: Option<&str>) -> Result<Option<u32>, ()> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<u64>() {
            Ok(0) | Err(_) => Err(()),
            Ok(n) => Ok(Some(u32::try_from(n).unwrap_or(u32::MAX))),
        },
    }
}

/// Validate a required address field.
pub fn require_address(field: &str, raw: Option<&str>) -> Result<WalletAddress, FieldError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(FieldError::new(field, "Address is required"));
    }
    WalletAddress::parse(raw).ok_or_else(|| FieldError::new(field, "Invalid Ethereum address"))
}

/// Validate a required, non-blank text field and return its trimmed value.
pub fn require_text(field: &str, raw: Option<&str>, message: &str) -> Result<String, FieldError> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        Err(FieldError::new(field, message))
    } else {
        Ok(value.to_string())
    }
}

/// Validate an optional category filter.
pub fn optional_category(raw: Option<&str>) -> Result<Option<Category>, FieldError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Category::parse(value)
            .map(Some)
            .ok_or_else(|| FieldError::new("category", "Invalid category")),
    }
}

/// Validate an optional creator address filter.
pub fn optional_creator(raw: Option<&str>) -> Result<Option<WalletAddress>, FieldError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => WalletAddress::parse(value)
            .map(Some)
            .ok_or_else(|| FieldError::new("creator", "Invalid creator address")),
    }
}

/// Validate a comment body.
pub fn comment_text(raw: Option<&str>) -> Result<String, FieldError> {
    let text = require_text("text", raw, "Comment text is required")?;
    if text.chars().count() > MAX_COMMENT_LEN {
        return Err(FieldError::new("text", "Comment too long"));
    }
    Ok(sanitize_string(&text, MAX_COMMENT_LEN))
}

/// Validate a content creation request on behalf of `creator`.
pub fn new_content(
    creator: WalletAddress,
    request: &CreateContentRequest,
) -> Result<NewContent, Vec<FieldError>> {
    let mut errors = Vec::new();

    let category = match require_text("category", request.category.as_deref(), "Category is required") {
        Ok(raw) => match Category::parse(&raw) {
            Some(category) => Some(category),
            None => {
                errors.push(FieldError::new("category", "Invalid category"));
                None
            }
        },
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let title = match require_text("title", request.title.as_deref(), "Title is required") {
        Ok(title) if title.chars().count() > MAX_TITLE_LEN => {
            errors.push(FieldError::new("title", "Title too long"));
            None
        }
        Ok(title) => Some(sanitize_string(&title, MAX_TITLE_LEN)),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let media_url = match require_text("mediaUrl", request.media_url.as_deref(), "Media URL is required") {
        Ok(url) => Some(url),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let description = match request.description.as_deref().map(str::trim) {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => {
            errors.push(FieldError::new("description", "Description too long"));
            None
        }
        Some("") | None => None,
        Some(d) => Some(sanitize_string(d, MAX_DESCRIPTION_LEN)),
    };

    let thumbnail_url = request
        .thumbnail_url
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    match (category, title, media_url) {
        (Some(category), Some(title), Some(media_url)) if errors.is_empty() => Ok(NewContent {
            creator_address: creator,
            category,
            title,
            description,
            media_url,
            thumbnail_url,
        }),
        _ => Err(errors),
    }
}

/// Validate a comment creation request, returning `(content_id, text)`.
pub fn new_comment(request: &CreateCommentRequest) -> Result<(String, String), Vec<FieldError>> {
    let content_id = require_text("contentId", request.content_id.as_deref(), "Content ID is required");
    let text = comment_text(request.text.as_deref());
    match (content_id, text) {
        (Ok(content_id), Ok(text)) => Ok((content_id, text)),
        (content_id, text) => Err([content_id.err(), text.err()].into_iter().flatten().collect()),
    }
}
