// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        Content, ContentListQuery, ContentListResponse, CreateContentRequest, PageQuery,
        Pagination, WalletAddress,
    },
    state::AppState,
    storage::{ContentFilter, ContentRepository},
    validators::{
        self, optional_category, optional_creator, PageRequest, DEFAULT_CONTENT_LIMIT,
    },
};

fn list_page(state: &AppState, filter: &ContentFilter, page: PageRequest) -> Result<ContentListResponse, ApiError> {
    let result = ContentRepository::new(&state.db).list(filter, page.offset(), page.limit as usize)?;
    Ok(ContentListResponse {
        content: result.items,
        pagination: Pagination::new(page.page, page.limit, result.total),
    })
}

/// Publish a content record for the authenticated creator.
#[utoipa::path(
    post,
    path = "/api/content/upload",
    request_body = CreateContentRequest,
    tag = "Content",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Content),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_content(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<CreateContentRequest>,
) -> Result<(StatusCode, Json<Content>), ApiError> {
    let new = validators::new_content(user.address, &request)?;
    let content = ContentRepository::new(&state.db).create(new)?;
    tracing::info!(
        content_id = %content.id,
        creator = %content.creator_address,
        category = %content.category,
        "Content created"
    );
    Ok((StatusCode::CREATED, Json(content)))
}

/// List content newest first, optionally filtered by category and creator.
#[utoipa::path(
    get,
    path = "/api/content",
    params(ContentListQuery),
    tag = "Content",
    responses(
        (status = 200, body = ContentListResponse),
        (status = 400, description = "Invalid filter or pagination")
    )
)]
pub async fn list_content(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ContentListQuery>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref(), DEFAULT_CONTENT_LIMIT);
    let category = optional_category(query.category.as_deref());
    let creator = optional_creator(query.creator.as_deref());

    let (page, category, creator) = match (page, category, creator) {
        (Ok(page), Ok(category), Ok(creator)) => (page, category, creator),
        (page, category, creator) => {
            let mut details = page.err().unwrap_or_default();
            details.extend(category.err());
            details.extend(creator.err());
            return Err(ApiError::validation(details));
        }
    };

    let filter = ContentFilter { category, creator };
    Ok(Json(list_page(&state, &filter, page)?))
}

#[utoipa::path(
    get,
    path = "/api/content/{id}",
    params(("id" = String, Path, description = "Content identifier")),
    tag = "Content",
    responses(
        (status = 200, body = Content),
        (status = 404, description = "Content not found")
    )
)]
pub async fn get_content(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Content>, ApiError> {
    ContentRepository::new(&state.db)
        .get(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Content not found"))
}

/// List one creator's content newest first.
#[utoipa::path(
    get,
    path = "/api/content/creator/{address}",
    params(
        ("address" = String, Path, description = "Creator wallet address"),
        PageQuery
    ),
    tag = "Content",
    responses(
        (status = 200, body = ContentListResponse),
        (status = 400, description = "Invalid address or pagination")
    )
)]
pub async fn list_by_creator(
    State(state): State<AppState>,
    ApiPath(address): ApiPath<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let creator = WalletAddress::parse(&address).ok_or_else(|| ApiError::bad_request("Invalid address"))?;
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref(), DEFAULT_CONTENT_LIMIT)?;

    let filter = ContentFilter {
        category: None,
        creator: Some(creator),
    };
    Ok(Json(list_page(&state, &filter, page)?))
}
