// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistent nonce store.
//!
//! Outstanding login challenges survive a restart and can be shared by
//! every handler through `Arc<dyn NonceStore>`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::super::database::{Database, DbError, DbResult, NONCES};
use crate::auth::nonce::{NonceRecord, NonceStore, NonceStoreError};

impl From<DbError> for NonceStoreError {
    fn from(e: DbError) -> Self {
        NonceStoreError(e.to_string())
    }
}

/// redb-backed [`NonceStore`].
pub struct NonceRepository {
    db: Arc<Database>,
}

impl NonceRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn read(&self, address: &str) -> DbResult<Option<NonceRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NONCES)?;
        match table.get(address)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn write(&self, address: &str, record: &NonceRecord) -> DbResult<()> {
        let json = serde_json::to_vec(record)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(NONCES)?;
            table.insert(address, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete(&self, address: &str) -> DbResult<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(NONCES)?;
            let removed = table.remove(address)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Compare-and-delete inside one write transaction.
    fn take_if_matches(&self, address: &str, nonce: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let write_txn = self.db.begin_write()?;
        let consumed = {
            let mut table = write_txn.open_table(NONCES)?;
            let current: Option<NonceRecord> = match table.get(address)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            match current {
                Some(record) if record.nonce == nonce && !record.is_expired(now) => {
                    table.remove(address)?;
                    true
                }
                _ => false,
            }
        };
        write_txn.commit()?;
        Ok(consumed)
    }

    fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<usize> {
        let write_txn = self.db.begin_write()?;
        let purged = {
            let mut table = write_txn.open_table(NONCES)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                match serde_json::from_slice::<NonceRecord>(value.value()) {
                    Ok(record) if record.is_expired(now) => expired.push(key.value().to_string()),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(address = key.value(), error = %e, "Dropping unreadable nonce record");
                        expired.push(key.value().to_string());
                    }
                }
            }
            for address in &expired {
                table.remove(address.as_str())?;
            }
            expired.len()
        };
        write_txn.commit()?;
        Ok(purged)
    }
}

impl NonceStore for NonceRepository {
    fn put(&self, address: &str, record: NonceRecord) -> Result<(), NonceStoreError> {
        Ok(self.write(address, &record)?)
    }

    fn get(&self, address: &str, now: DateTime<Utc>) -> Result<Option<NonceRecord>, NonceStoreError> {
        match self.read(address)? {
            Some(record) if record.is_expired(now) => {
                self.delete(address)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn remove(&self, address: &str) -> Result<bool, NonceStoreError> {
        Ok(self.delete(address)?)
    }

    fn consume(&self, address: &str, nonce: &str, now: DateTime<Utc>) -> Result<bool, NonceStoreError> {
        Ok(self.take_if_matches(address, nonce, now)?)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, NonceStoreError> {
        Ok(self.delete_expired(now)?)
    }
}
