// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end flows against the real router on an ephemeral port, driven
//! through the client library.

use alloy::signers::local::PrivateKeySigner;
use tempfile::TempDir;
use tipjar_server::{
    api::router,
    client::{ApiClient, ClientError, ContentParams, PageParams, WalletSession},
    config::Config,
    media::UploadKind,
    models::{Category, CreateContentRequest},
    state::AppState,
    storage::Database,
};

/// Spin up a server over a fresh data directory and return its API base URL.
async fn spawn_server() -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Config {
        data_dir: dir.path().join("data"),
        upload_dir: dir.path().join("uploads"),
        jwt_secret: "integration-secret".to_string(),
        ..Config::default()
    };
    let db = Database::open(&config.database_path()).expect("database opens");
    let state = AppState::new(config, db).expect("state builds");
    state.media.ensure_upload_dir().await.expect("upload dir");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    (format!("http://{addr}/api"), dir)
}

async fn logged_in(base: &str) -> (WalletSession, PrivateKeySigner) {
    let signer = PrivateKeySigner::random();
    let mut session = WalletSession::new(ApiClient::new(base).unwrap());
    session.login(&signer).await.expect("login succeeds");
    (session, signer)
}

#[tokio::test]
async fn creator_publishes_and_fan_likes() {
    let (base, _dir) = spawn_server().await;
    let (creator, signer) = logged_in(&base).await;
    let (fan, _) = logged_in(&base).await;

    let upload = creator
        .client()
        .upload(UploadKind::Media, "track.mp3", "audio/mpeg", b"ID3 fake audio".to_vec())
        .await
        .expect("upload succeeds");
    assert!(upload.url.starts_with("/uploads/"));

    let content = creator
        .client()
        .create_content(&CreateContentRequest {
            category: Some("music".into()),
            title: Some("Night Drive".into()),
            media_url: Some(upload.url.clone()),
            ..CreateContentRequest::default()
        })
        .await
        .expect("content created");
    assert_eq!(
        content.creator_address.as_str(),
        signer.address().to_string().to_lowercase()
    );

    let liked = fan.client().toggle_like(&content.id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(fan.client().like_count(&content.id).await.unwrap().count, 1);
    assert!(fan.client().check_liked(&content.id).await.unwrap().liked);
    assert!(!creator.client().check_liked(&content.id).await.unwrap().liked);

    let unliked = fan.client().toggle_like(&content.id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.message, "Content unliked");
    assert_eq!(fan.client().like_count(&content.id).await.unwrap().count, 0);

    let listed = fan
        .client()
        .list_content(&ContentParams {
            category: Some(Category::Music),
            ..ContentParams::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.pagination.total, 1);
    assert_eq!(listed.content[0].id, content.id);

    let by_creator = fan
        .client()
        .content_by_creator(&signer.address().to_checksum(None), PageParams::default())
        .await
        .unwrap();
    assert_eq!(by_creator.content.len(), 1);
}

#[tokio::test]
async fn comment_lifecycle() {
    let (base, _dir) = spawn_server().await;
    let (author, _) = logged_in(&base).await;
    let (other, _) = logged_in(&base).await;

    let content = author
        .client()
        .create_content(&CreateContentRequest {
            category: Some("article".into()),
            title: Some("Notes".into()),
            media_url: Some("/uploads/notes.pdf".into()),
            ..CreateContentRequest::default()
        })
        .await
        .unwrap();

    let comment = author.client().post_comment(&content.id, "First!").await.unwrap();

    let err = other.client().update_comment(&comment.id, "hijack").await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    let edited = author.client().update_comment(&comment.id, "First, edited").await.unwrap();
    assert_eq!(edited.text, "First, edited");

    author.client().delete_comment(&comment.id).await.unwrap();
    let page = other.client().comments(&content.id, PageParams::default()).await.unwrap();
    assert_eq!(page.pagination.total, 0);

    match author.client().update_comment(&comment.id, "again").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Cannot edit deleted comment");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    let err = author.client().delete_comment(&comment.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn anonymous_and_unconfigured_paths() {
    let (base, _dir) = spawn_server().await;
    let anonymous = ApiClient::new(&base).unwrap();

    let err = anonymous.toggle_like("whatever").await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    // No RPC endpoint configured.
    let err = anonymous.tip_jars().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    let creator = PrivateKeySigner::random().address().to_checksum(None);
    let err = anonymous.creator_tip_jar(&creator).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    let err = anonymous.creator_tips(&creator).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}
