// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthService, NonceStore, TokenIssuer};
use crate::blockchain::{BlockchainError, TipJarClient};
use crate::config::Config;
use crate::media::MediaService;
use crate::storage::{Database, LikeCountCache, NonceRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Database>,
    pub auth: AuthService,
    pub media: Arc<MediaService>,
    /// `None` when no RPC endpoint or registry address is configured.
    pub tipjars: Option<Arc<TipJarClient>>,
    pub like_counts: Arc<LikeCountCache>,
}

impl AppState {
    /// Assemble the state with the redb-backed nonce store.
    pub fn new(config: Config, db: Database) -> Result<Self, BlockchainError> {
        let db = Arc::new(db);
        let nonces: Arc<dyn NonceStore> = Arc::new(NonceRepository::new(db.clone()));
        Self::with_nonce_store(config, db, nonces)
    }

    pub fn with_nonce_store(
        config: Config,
        db: Arc<Database>,
        nonces: Arc<dyn NonceStore>,
    ) -> Result<Self, BlockchainError> {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_expiration);
        let tipjars = config
            .chain
            .as_ref()
            .map(TipJarClient::new)
            .transpose()?
            .map(Arc::new);

        Ok(Self {
            auth: AuthService::new(nonces, tokens),
            media: Arc::new(MediaService::from_config(&config)),
            config: Arc::new(config),
            db,
            tipjars,
            like_counts: Arc::new(LikeCountCache::default()),
        })
    }

    /// The tip jar client, or [`BlockchainError::NotConfigured`].
    pub fn tipjars(&self) -> Result<&TipJarClient, BlockchainError> {
        self.tipjars.as_deref().ok_or(BlockchainError::NotConfigured)
    }
}

/// State over a temporary database and upload directory.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().join("data"),
        upload_dir: dir.path().join("uploads"),
        jwt_secret: "test-secret".to_string(),
        max_file_size: 1024,
        max_thumbnail_size: 256,
        ..Config::default()
    };
    std::fs::create_dir_all(&config.upload_dir).unwrap();
    let db = Database::open(&config.database_path()).unwrap();
    (AppState::new(config, db).unwrap(), dir)
}
