// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `content`: content_id → serialized Content
//! - `content_by_time`: `!created_at|content_id` → ()
//! - `content_by_creator`: `creator|!created_at|content_id` → ()
//! - `content_by_category`: `category|!created_at|content_id` → ()
//! - `likes`: `content_id|address` → serialized Like
//! - `comments`: comment_id → serialized Comment
//! - `comments_by_content`: `content_id|!created_at|comment_id` → ()
//! - `nonces`: address → serialized nonce record
//!
//! Index keys embed an inverted big-endian timestamp so a forward range
//! scan yields newest-first order.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database as RedbDatabase, ReadableDatabase, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const CONTENT: TableDefinition<&str, &[u8]> = TableDefinition::new("content");
pub(crate) const CONTENT_BY_TIME: TableDefinition<&[u8], ()> = TableDefinition::new("content_by_time");
pub(crate) const CONTENT_BY_CREATOR: TableDefinition<&[u8], ()> =
    TableDefinition::new("content_by_creator");
pub(crate) const CONTENT_BY_CATEGORY: TableDefinition<&[u8], ()> =
    TableDefinition::new("content_by_category");
pub(crate) const LIKES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("likes");
pub(crate) const COMMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("comments");
pub(crate) const COMMENTS_BY_CONTENT: TableDefinition<&[u8], ()> =
    TableDefinition::new("comments_by_content");
pub(crate) const NONCES: TableDefinition<&str, &[u8]> = TableDefinition::new("nonces");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The named entity does not exist (e.g. "Content").
    #[error("{0} not found")]
    NotFound(String),

    #[error("duplicate {0}")]
    Conflict(String),
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Invert a timestamp so that newer instants sort first.
fn inverted_timestamp(at: DateTime<Utc>) -> [u8; 8] {
    let micros = at.timestamp_micros().max(0) as u64;
    (u64::MAX - micros).to_be_bytes()
}

/// Build a composite key `prefix|!timestamp|id` (prefix may be empty).
pub(crate) fn time_index_key(prefix: &str, at: DateTime<Utc>, id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 1 + 8 + 1 + id.len());
    if !prefix.is_empty() {
        key.extend_from_slice(prefix.as_bytes());
        key.push(b'|');
    }
    key.extend_from_slice(&inverted_timestamp(at));
    key.push(b'|');
    key.extend_from_slice(id.as_bytes());
    key
}

/// Lower and upper bounds covering every key that starts with `prefix|`.
pub(crate) fn prefix_range(prefix: &str) -> (Vec<u8>, Vec<u8>) {
    let mut start = Vec::with_capacity(prefix.len() + 1);
    start.extend_from_slice(prefix.as_bytes());
    start.push(b'|');

    let mut end = start.clone();
    // '|' + 1: every key with this prefix sorts below it.
    if let Some(last) = end.last_mut() {
        *last = b'|' + 1;
    }
    (start, end)
}

/// Extract the trailing id from a composite index key (after the timestamp).
pub(crate) fn id_from_index_key(key: &[u8]) -> Option<String> {
    // Ids never contain '|', so the last separator precedes the id.
    if key.len() < 10 {
        return None;
    }
    let sep = key.iter().rposition(|&b| b == b'|')?;
    String::from_utf8(key[sep + 1..].to_vec()).ok()
}

/// Key of a like row: `content_id|address`.
pub(crate) fn like_key(content_id: &str, address: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(content_id.len() + 1 + address.len());
    key.extend_from_slice(content_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(address.as_bytes());
    key
}

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID document store shared by all repositories.
pub struct Database {
    db: RedbDatabase,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = RedbDatabase::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CONTENT)?;
            let _ = write_txn.open_table(CONTENT_BY_TIME)?;
            let _ = write_txn.open_table(CONTENT_BY_CREATOR)?;
            let _ = write_txn.open_table(CONTENT_BY_CATEGORY)?;
            let _ = write_txn.open_table(LIKES)?;
            let _ = write_txn.open_table(COMMENTS)?;
            let _ = write_txn.open_table(COMMENTS_BY_CONTENT)?;
            let _ = write_txn.open_table(NONCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_read(&self) -> DbResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn begin_write(&self) -> DbResult<redb::WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Cheap liveness probe used by the health endpoint.
    pub fn check(&self) -> DbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(CONTENT)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn temp_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("test.redb")).unwrap();
    (db, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_index_key_ordering() {
        // Newer timestamps should produce smaller composite keys (descending)
        let old = Utc.timestamp_opt(1_000, 0).unwrap();
        let new = Utc.timestamp_opt(2_000, 0).unwrap();
        let key_old = time_index_key("0xaddr", old, "id-1");
        let key_new = time_index_key("0xaddr", new, "id-2");
        assert!(key_new < key_old, "Newer timestamps should sort first");
    }

    #[test]
    fn prefix_range_covers_only_prefix() {
        let (start, end) = prefix_range("music");
        let inside = time_index_key("music", Utc::now(), "abc");
        let other = time_index_key("musical", Utc::now(), "abc");
        assert!(inside.as_slice() >= start.as_slice() && inside.as_slice() < end.as_slice());
        assert!(!(other.as_slice() >= start.as_slice() && other.as_slice() < end.as_slice()));
    }

    #[test]
    fn id_round_trips_through_index_key() {
        let id = "3f2a6d7e-1b8c-4c3d-9e0f-123456789abc";
        let key = time_index_key("creator", Utc::now(), id);
        assert_eq!(id_from_index_key(&key).as_deref(), Some(id));

        let key = time_index_key("", Utc::now(), id);
        assert_eq!(id_from_index_key(&key).as_deref(), Some(id));
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.redb");
        let db = Database::open(&path).unwrap();
        db.check().unwrap();
        assert!(path.exists());
    }
}
