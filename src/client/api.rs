// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the REST API.

use reqwest::{multipart, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::ClientError;
use crate::media::UploadKind;
use crate::models::{
    Category, Comment, CommentListResponse, Content, ContentListResponse, CreateContentRequest,
    LikeCountResponse, LikeStatusResponse, MessageResponse, NonceResponse, TipHistoryResponse,
    TipJarListResponse, TipJarStatusResponse, ToggleLikeResponse, UploadResponse, VerifyResponse,
};

/// Pagination parameters for list calls.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Filters for [`ApiClient::list_content`].
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ContentParams {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the `/api` routes.
///
/// `base_url` includes the `/api` prefix, e.g. `http://localhost:5000/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// URL of `segments` under the base, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(segments));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        parse_response(response).await
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    pub async fn get_nonce(&self, address: &str) -> Result<NonceResponse, ClientError> {
        let body = serde_json::json!({ "address": address });
        self.send(self.request(Method::POST, &["auth", "nonce"]).json(&body))
            .await
    }

    pub async fn verify(&self, address: &str, signature: &str) -> Result<VerifyResponse, ClientError> {
        let body = serde_json::json!({ "address": address, "signature": signature });
        self.send(self.request(Method::POST, &["auth", "verify"]).json(&body))
            .await
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    pub async fn create_content(&self, request: &CreateContentRequest) -> Result<Content, ClientError> {
        self.send(self.request(Method::POST, &["content", "upload"]).json(request))
            .await
    }

    pub async fn list_content(&self, params: &ContentParams) -> Result<ContentListResponse, ClientError> {
        self.send(self.request(Method::GET, &["content"]).query(params))
            .await
    }

    pub async fn get_content(&self, id: &str) -> Result<Content, ClientError> {
        self.send(self.request(Method::GET, &["content", id])).await
    }

    pub async fn content_by_creator(
        &self,
        address: &str,
        page: PageParams,
    ) -> Result<ContentListResponse, ClientError> {
        self.send(
            self.request(Method::GET, &["content", "creator", address])
                .query(&page),
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Media
    // -------------------------------------------------------------------------

    /// Upload a file as a multipart `file` field.
    pub async fn upload(
        &self,
        kind: UploadKind,
        filename: &str,
        mime: &str,
        data: Vec<u8>,
    ) -> Result<UploadResponse, ClientError> {
        let part = multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = multipart::Form::new().part(crate::api::media::FILE_FIELD, part);
        let route = match kind {
            UploadKind::Media => "upload",
            UploadKind::Thumbnail => "thumbnail",
        };
        self.send(self.request(Method::POST, &["media", route]).multipart(form))
            .await
    }

    // -------------------------------------------------------------------------
    // Likes and comments
    // -------------------------------------------------------------------------

    pub async fn toggle_like(&self, content_id: &str) -> Result<ToggleLikeResponse, ClientError> {
        let body = serde_json::json!({ "contentId": content_id });
        self.send(self.request(Method::POST, &["likes", "toggle"]).json(&body))
            .await
    }

    pub async fn like_count(&self, content_id: &str) -> Result<LikeCountResponse, ClientError> {
        self.send(self.request(Method::GET, &["likes", "count", content_id]))
            .await
    }

    pub async fn check_liked(&self, content_id: &str) -> Result<LikeStatusResponse, ClientError> {
        self.send(self.request(Method::GET, &["likes", "me", content_id]))
            .await
    }

    pub async fn comments(&self, content_id: &str, page: PageParams) -> Result<CommentListResponse, ClientError> {
        self.send(self.request(Method::GET, &["comments", content_id]).query(&page))
            .await
    }

    pub async fn post_comment(&self, content_id: &str, text: &str) -> Result<Comment, ClientError> {
        let body = serde_json::json!({ "contentId": content_id, "text": text });
        self.send(self.request(Method::POST, &["comments"]).json(&body))
            .await
    }

    pub async fn update_comment(&self, comment_id: &str, text: &str) -> Result<Comment, ClientError> {
        let body = serde_json::json!({ "text": text });
        self.send(self.request(Method::PUT, &["comments", comment_id]).json(&body))
            .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &["comments", comment_id]))
            .await
    }

    // -------------------------------------------------------------------------
    // Tip jars
    // -------------------------------------------------------------------------

    pub async fn tip_jars(&self) -> Result<TipJarListResponse, ClientError> {
        self.send(self.request(Method::GET, &["tipjars"])).await
    }

    pub async fn creator_tip_jar(&self, creator: &str) -> Result<TipJarStatusResponse, ClientError> {
        self.send(self.request(Method::GET, &["tipjars", creator])).await
    }

    pub async fn creator_tips(&self, creator: &str) -> Result<TipHistoryResponse, ClientError> {
        self.send(self.request(Method::GET, &["tipjars", creator, "tips"]))
            .await
    }
}

/// Decode a success body, or turn an error body into [`ClientError::Api`].
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
    };
    tracing::debug!(status = status.as_u16(), %message, "API request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
