// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::{ApiJson, ApiPath};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{LikeCountResponse, LikeStatusResponse, ToggleLikeRequest, ToggleLikeResponse},
    state::AppState,
    storage::{DbError, LikeRepository},
    validators::require_text,
};

/// Like or unlike a piece of content.
#[utoipa::path(
    post,
    path = "/api/likes/toggle",
    request_body = ToggleLikeRequest,
    tag = "Likes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = ToggleLikeResponse),
        (status = 400, description = "Missing content id"),
        (status = 404, description = "Content not found")
    )
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<ToggleLikeRequest>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
    let content_id = require_text("contentId", request.content_id.as_deref(), "Content ID is required")?;

    let liked = LikeRepository::new(&state.db)
        .toggle(&content_id, &user.address)
        .map_err(|e| match e {
            DbError::NotFound(_) => ApiError::not_found("Content not found"),
            other => other.into(),
        })?;
    state.like_counts.invalidate(&content_id);

    let message = if liked { "Content liked" } else { "Content unliked" };
    Ok(Json(ToggleLikeResponse {
        liked,
        message: message.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/likes/count/{content_id}",
    params(("content_id" = String, Path, description = "Content identifier")),
    tag = "Likes",
    responses((status = 200, body = LikeCountResponse))
)]
pub async fn like_count(
    State(state): State<AppState>,
    ApiPath(content_id): ApiPath<String>,
) -> Result<Json<LikeCountResponse>, ApiError> {
    let count = match state.like_counts.get(&content_id) {
        Some(count) => count,
        None => {
            let count = LikeRepository::new(&state.db).count(&content_id)?;
            state.like_counts.put(&content_id, count);
            count
        }
    };
    Ok(Json(LikeCountResponse { content_id, count }))
}

/// Whether the caller has liked a piece of content.
#[utoipa::path(
    get,
    path = "/api/likes/me/{content_id}",
    params(("content_id" = String, Path, description = "Content identifier")),
    tag = "Likes",
    security(("bearer_auth" = [])),
    responses((status = 200, body = LikeStatusResponse))
)]
pub async fn my_like(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiPath(content_id): ApiPath<String>,
) -> Result<Json<LikeStatusResponse>, ApiError> {
    let liked = LikeRepository::new(&state.db).has_liked(&content_id, &user.address)?;
    Ok(Json(LikeStatusResponse { content_id, liked }))
}
