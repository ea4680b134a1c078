// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Nonce Store
//!
//! Single-use login challenges keyed by lowercase wallet address.
//!
//! Expiry is enforced twice: lazily (an expired record is evicted and
//! reported absent on read) and actively by the [`NonceReaper`] background
//! task.
//!
//! ## Implementations
//!
//! - [`MemoryNonceStore`]: mutex-guarded map, process local
//! - [`NonceRepository`](crate::storage::NonceRepository): redb table,
//!   survives restarts

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default interval between reaper sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// A live challenge for one address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NonceRecord {
    pub nonce: String,
    pub expires_at: DateTime<Utc>,
}

impl NonceRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, thiserror::Error)]
#[error("nonce store error: {0}")]
pub struct NonceStoreError(pub String);

/// Expiring address → nonce store shared by all handlers.
pub trait NonceStore: Send + Sync {
    /// Store `record` for `address`, replacing any previous nonce.
    fn put(&self, address: &str, record: NonceRecord) -> Result<(), NonceStoreError>;

    /// Live record for `address`. Expired records are removed and reported
    /// as absent.
    fn get(&self, address: &str, now: DateTime<Utc>) -> Result<Option<NonceRecord>, NonceStoreError>;

    /// Remove the record for `address`. Returns whether one existed.
    fn remove(&self, address: &str) -> Result<bool, NonceStoreError>;

    /// Remove the record only if it is live and still holds `nonce`.
    fn consume(&self, address: &str, nonce: &str, now: DateTime<Utc>) -> Result<bool, NonceStoreError>;

    /// Remove every record expired at `now`. Returns how many were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, NonceStoreError>;
}

/// Process-local [`NonceStore`].
#[derive(Debug, Default)]
pub struct MemoryNonceStore {
    entries: Mutex<HashMap<String, NonceRecord>>,
}

impl MemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, NonceRecord>>, NonceStoreError> {
        self.entries
            .lock()
            .map_err(|_| NonceStoreError("nonce map lock poisoned".to_string()))
    }
}

impl NonceStore for MemoryNonceStore {
    fn put(&self, address: &str, record: NonceRecord) -> Result<(), NonceStoreError> {
        self.lock()?.insert(address.to_string(), record);
        Ok(())
    }

    fn get(&self, address: &str, now: DateTime<Utc>) -> Result<Option<NonceRecord>, NonceStoreError> {
        let mut entries = self.lock()?;
        if entries.get(address).is_some_and(|record| record.is_expired(now)) {
            entries.remove(address);
            return Ok(None);
        }
        Ok(entries.get(address).cloned())
    }

    fn remove(&self, address: &str) -> Result<bool, NonceStoreError> {
        Ok(self.lock()?.remove(address).is_some())
    }

    fn consume(&self, address: &str, nonce: &str, now: DateTime<Utc>) -> Result<bool, NonceStoreError> {
        let mut entries = self.lock()?;
        let matches = entries
            .get(address)
            .is_some_and(|record| record.nonce == nonce && !record.is_expired(now));
        if matches {
            entries.remove(address);
        }
        Ok(matches)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, NonceStoreError> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, record| !record.is_expired(now));
        Ok(before - entries.len())
    }
}

// =============================================================================
// Reaper
// =============================================================================

/// Background task that periodically drops expired nonces.
pub struct NonceReaper {
    store: Arc<dyn NonceStore>,
    sweep_interval: Duration,
}

impl NonceReaper {
    pub fn new(store: Arc<dyn NonceStore>) -> Self {
        Self {
            store,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(reaper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.sweep_interval.as_secs(),
            "Nonce reaper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.sweep_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Nonce reaper shutting down");
                    return;
                }
            }

            self.sweep();
        }
    }

    /// Execute one sweep. Returns the number of nonces removed.
    pub fn sweep(&self) -> usize {
        match self.store.purge_expired(Utc::now()) {
            Ok(0) => 0,
            Ok(purged) => {
                info!(purged, "Nonce reaper: removed expired nonces");
                purged
            }
            Err(e) => {
                warn!(error = %e, "Nonce reaper: sweep failed");
                0
            }
        }
    }
}
