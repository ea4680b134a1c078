// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        Comment, CommentListResponse, CreateCommentRequest, MessageResponse, PageQuery,
        Pagination, UpdateCommentRequest,
    },
    state::AppState,
    storage::{CommentRepository, DbError},
    validators::{self, comment_text, PageRequest, DEFAULT_COMMENT_LIMIT},
};

const COMMENT_NOT_FOUND: &str = "Comment not found";

#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    tag = "Comments",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Comment),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Content not found")
    )
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let (content_id, text) = validators::new_comment(&request)?;
    let comment = CommentRepository::new(&state.db)
        .create(&content_id, &user.address, text)
        .map_err(|e| match e {
            DbError::NotFound(_) => ApiError::not_found("Content not found"),
            other => other.into(),
        })?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Live comments on a piece of content, newest first.
#[utoipa::path(
    get,
    path = "/api/comments/{content_id}",
    params(
        ("content_id" = String, Path, description = "Content identifier"),
        PageQuery
    ),
    tag = "Comments",
    responses(
        (status = 200, body = CommentListResponse),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath(content_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let page = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref(), DEFAULT_COMMENT_LIMIT)?;
    let result =
        CommentRepository::new(&state.db).list_for_content(&content_id, page.offset(), page.limit as usize)?;
    Ok(Json(CommentListResponse {
        comments: result.items,
        pagination: Pagination::new(page.page, page.limit, result.total),
    }))
}

/// Edit the text of one of the caller's comments.
#[utoipa::path(
    put,
    path = "/api/comments/{comment_id}",
    params(("comment_id" = String, Path, description = "Comment identifier")),
    request_body = UpdateCommentRequest,
    tag = "Comments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Comment),
        (status = 400, description = "Validation error or deleted comment"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn update_comment(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiPath(comment_id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let text = comment_text(request.text.as_deref())?;
    let repo = CommentRepository::new(&state.db);

    let comment = repo
        .get(&comment_id)?
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;
    if comment.address != user.address {
        return Err(ApiError::forbidden("Not authorized to edit this comment"));
    }
    if comment.deleted {
        return Err(ApiError::bad_request("Cannot edit deleted comment"));
    }

    Ok(Json(repo.update_text(&comment_id, text)?))
}

/// Soft-delete one of the caller's comments.
#[utoipa::path(
    delete,
    path = "/api/comments/{comment_id}",
    params(("comment_id" = String, Path, description = "Comment identifier")),
    tag = "Comments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    Auth(user): Auth,
    ApiPath(comment_id): ApiPath<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = CommentRepository::new(&state.db);

    let comment = repo
        .get(&comment_id)?
        .filter(|c| !c.deleted)
        .ok_or_else(|| ApiError::not_found(COMMENT_NOT_FOUND))?;
    if comment.address != user.address {
        return Err(ApiError::forbidden("Not authorized to delete this comment"));
    }

    repo.soft_delete(&comment_id)?;
    tracing::info!(comment_id = %comment_id, address = %user.address, "Comment deleted");
    Ok(Json(MessageResponse::new("Comment deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{auth_for, seed_content, ALICE, BOB};
    use crate::state::test_state;

    async fn post(state: &AppState, who: &str, content_id: &str, text: &str) -> Comment {
        let (status, Json(comment)) = create_comment(
            State(state.clone()),
            auth_for(who),
            ApiJson(CreateCommentRequest {
                content_id: Some(content_id.into()),
                text: Some(text.into()),
            }),
        )
        .await
        .expect("comment created");
        assert_eq!(status, StatusCode::CREATED);
        comment
    }

    async fn list(state: &AppState, content_id: &str) -> CommentListResponse {
        let Json(body) = list_comments(
            State(state.clone()),
            ApiPath(content_id.into()),
            ApiQuery(PageQuery::default()),
        )
        .await
        .unwrap();
        body
    }

    fn edit(text: &str) -> ApiJson<UpdateCommentRequest> {
        ApiJson(UpdateCommentRequest {
            text: Some(text.into()),
        })
    }

    #[tokio::test]
    async fn create_and_list_newest_first() {
        let (state, _dir) = test_state();
        let content_id = seed_content(&state, BOB);

        post(&state, ALICE, &content_id, "first").await;
        let second = post(&state, BOB, &content_id, "  second  ").await;
        assert_eq!(second.text, "second");

        let body = list(&state, &content_id).await;
        assert_eq!(body.comments.len(), 2);
        assert_eq!(body.comments[0].id, second.id);
        assert_eq!(body.pagination.limit, DEFAULT_COMMENT_LIMIT);
        assert_eq!(body.pagination.total, 2);
    }

    #[tokio::test]
    async fn create_on_missing_content_is_404() {
        let (state, _dir) = test_state();
        let err = create_comment(
            State(state),
            auth_for(ALICE),
            ApiJson(CreateCommentRequest {
                content_id: Some("missing".into()),
                text: Some("hello".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Content not found");
    }

    #[tokio::test]
    async fn only_the_author_may_edit_or_delete() {
        let (state, _dir) = test_state();
        let content_id = seed_content(&state, BOB);
        let comment = post(&state, ALICE, &content_id, "mine").await;

        let err = update_comment(State(state.clone()), auth_for(BOB), ApiPath(comment.id.clone()), edit("x"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = delete_comment(State(state.clone()), auth_for(BOB), ApiPath(comment.id.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(updated) = update_comment(
            State(state.clone()),
            auth_for(ALICE),
            ApiPath(comment.id.clone()),
            edit("edited"),
        )
        .await
        .unwrap();
        assert_eq!(updated.text, "edited");
        assert!(updated.updated_at >= comment.updated_at);
    }

    #[tokio::test]
    async fn deleted_comment_is_hidden() {
        let (state, _dir) = test_state();
        let content_id = seed_content(&state, BOB);
        let comment = post(&state, ALICE, &content_id, "soon gone").await;

        let Json(ack) = delete_comment(State(state.clone()), auth_for(ALICE), ApiPath(comment.id.clone()))
            .await
            .unwrap();
        assert_eq!(ack.message, "Comment deleted");
        assert_eq!(list(&state, &content_id).await.pagination.total, 0);

        let err = update_comment(
            State(state.clone()),
            auth_for(ALICE),
            ApiPath(comment.id.clone()),
            edit("back"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Cannot edit deleted comment");

        let err = delete_comment(State(state), auth_for(ALICE), ApiPath(comment.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, COMMENT_NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_comment_is_404() {
        let (state, _dir) = test_state();
        let err = update_comment(State(state), auth_for(ALICE), ApiPath("nope".into()), edit("x"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
