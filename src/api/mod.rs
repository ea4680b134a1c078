// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{TipJarInfo, TipRecord},
    error::ApiError,
    media::UPLOADS_ROUTE,
    models::{
        Category, Comment, CommentListResponse, Content, ContentListResponse,
        CreateCommentRequest, CreateContentRequest, LikeCountResponse, LikeStatusResponse,
        MessageResponse, NonceRequest, NonceResponse, Pagination, TipHistoryResponse,
        TipJarListResponse, TipJarStatusResponse, ToggleLikeRequest, ToggleLikeResponse,
        UpdateCommentRequest, UploadResponse, VerifyRequest, VerifyResponse, WalletAddress,
    },
    state::AppState,
    validators::FieldError,
};

pub mod auth;
pub mod comments;
pub mod content;
pub mod extract;
pub mod health;
pub mod likes;
pub mod media;
pub mod tipjars;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

fn body_limit(file_limit: u64) -> usize {
    usize::try_from(file_limit.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

pub fn router(state: AppState) -> Router {
    let media_limit = body_limit(state.config.max_file_size);
    let thumbnail_limit = body_limit(state.config.max_thumbnail_size);

    let api_routes = Router::new()
        .route("/auth/nonce", post(auth::request_nonce))
        .route("/auth/verify", post(auth::verify))
        .route("/content", get(content::list_content))
        .route("/content/upload", post(content::create_content))
        .route("/content/creator/{address}", get(content::list_by_creator))
        .route("/content/{id}", get(content::get_content))
        .route("/likes/toggle", post(likes::toggle_like))
        .route("/likes/count/{content_id}", get(likes::like_count))
        .route("/likes/me/{content_id}", get(likes::my_like))
        .route("/comments", post(comments::create_comment))
        // GET takes a content id, PUT and DELETE a comment id.
        .route(
            "/comments/{id}",
            get(comments::list_comments)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/media/upload",
            post(media::upload_media).layer(DefaultBodyLimit::max(media_limit)),
        )
        .route(
            "/media/thumbnail",
            post(media::upload_thumbnail).layer(DefaultBodyLimit::max(thumbnail_limit)),
        )
        .route("/tipjars", get(tipjars::list_tip_jars))
        .route("/tipjars/{creator}", get(tipjars::get_creator_tip_jar))
        .route("/tipjars/{creator}/tips", get(tipjars::get_creator_tips));

    let cors = cors_layer(&state.config.allowed_origins);
    let uploads = ServeDir::new(state.media.upload_dir());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/api", api_routes)
        .nest_service(UPLOADS_ROUTE, uploads)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

struct BearerAuthAddon;

impl Modify for BearerAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::request_nonce,
        auth::verify,
        content::create_content,
        content::list_content,
        content::get_content,
        content::list_by_creator,
        likes::toggle_like,
        likes::like_count,
        likes::my_like,
        comments::create_comment,
        comments::list_comments,
        comments::update_comment,
        comments::delete_comment,
        media::upload_media,
        media::upload_thumbnail,
        tipjars::list_tip_jars,
        tipjars::get_creator_tip_jar,
        tipjars::get_creator_tips
    ),
    components(
        schemas(
            WalletAddress,
            Category,
            Content,
            Comment,
            Pagination,
            FieldError,
            NonceRequest,
            NonceResponse,
            VerifyRequest,
            VerifyResponse,
            CreateContentRequest,
            ContentListResponse,
            ToggleLikeRequest,
            ToggleLikeResponse,
            LikeCountResponse,
            LikeStatusResponse,
            CreateCommentRequest,
            UpdateCommentRequest,
            CommentListResponse,
            MessageResponse,
            UploadResponse,
            TipJarInfo,
            TipRecord,
            TipJarListResponse,
            TipJarStatusResponse,
            TipHistoryResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuthAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Wallet signature login"),
        (name = "Content", description = "Creator content catalog"),
        (name = "Likes", description = "Content likes"),
        (name = "Comments", description = "Content comments"),
        (name = "Media", description = "File uploads"),
        (name = "Tip Jars", description = "On-chain tip jar reads")
    )
)]
struct ApiDoc;
