// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Like repository.
//!
//! The `(content_id, address)` pair is the primary key of the likes table,
//! so at most one like per user per content can exist.

use chrono::Utc;
use redb::ReadableTable;

use super::super::database::{like_key, prefix_range, Database, DbError, DbResult, CONTENT, LIKES};
use crate::models::{Like, WalletAddress};

pub struct LikeRepository<'a> {
    db: &'a Database,
}

impl<'a> LikeRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Flip the like state of `(content_id, address)` and return the new state.
    ///
    /// The content check and the insert-or-delete run in one write
    /// transaction; redb serializes writers, so two concurrent toggles can
    /// never both insert.
    pub fn toggle(&self, content_id: &str, address: &WalletAddress) -> DbResult<bool> {
        let key = like_key(content_id, address.as_str());

        let write_txn = self.db.begin_write()?;
        let liked = {
            let content = write_txn.open_table(CONTENT)?;
            if content.get(content_id)?.is_none() {
                return Err(DbError::NotFound("Content".to_string()));
            }

            let mut likes = write_txn.open_table(LIKES)?;
            if likes.remove(key.as_slice())?.is_some() {
                false
            } else {
                let like = Like {
                    content_id: content_id.to_string(),
                    address: address.clone(),
                    created_at: Utc::now(),
                };
                let json = serde_json::to_vec(&like)?;
                likes.insert(key.as_slice(), json.as_slice())?;
                true
            }
        };
        write_txn.commit()?;

        tracing::debug!(content_id, address = %address, liked, "Like toggled");
        Ok(liked)
    }

    /// Number of likes on a piece of content.
    pub fn count(&self, content_id: &str) -> DbResult<u64> {
        let read_txn = self.db.begin_read()?;
        let likes = read_txn.open_table(LIKES)?;
        let (start, end) = prefix_range(content_id);
        let mut count = 0u64;
        for entry in likes.range(start.as_slice()..end.as_slice())? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    pub fn has_liked(&self, content_id: &str, address: &WalletAddress) -> DbResult<bool> {
        let read_txn = self.db.begin_read()?;
        let likes = read_txn.open_table(LIKES)?;
        let key = like_key(content_id, address.as_str());
        Ok(likes.get(key.as_slice())?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewContent};
    use crate::storage::database::temp_db;
    use crate::storage::ContentRepository;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}", format!("{n:02x}").repeat(20))).unwrap()
    }

    fn seed_content(db: &Database) -> String {
        ContentRepository::new(db)
            .create(NewContent {
                creator_address: addr(1),
                category: Category::Podcast,
                title: "Episode".into(),
                description: None,
                media_url: "/uploads/ep.mp3".into(),
                thumbnail_url: None,
            })
            .unwrap()
            .id
    }

    #[test]
    fn toggle_twice_restores_state() {
        let (db, _dir) = temp_db();
        let id = seed_content(&db);
        let repo = LikeRepository::new(&db);
        let user = addr(2);

        assert!(repo.toggle(&id, &user).unwrap());
        assert!(repo.has_liked(&id, &user).unwrap());
        assert_eq!(repo.count(&id).unwrap(), 1);

        assert!(!repo.toggle(&id, &user).unwrap());
        assert!(!repo.has_liked(&id, &user).unwrap());
        assert_eq!(repo.count(&id).unwrap(), 0);
    }

    #[test]
    fn likes_are_counted_per_content() {
        let (db, _dir) = temp_db();
        let first = seed_content(&db);
        let second = seed_content(&db);
        let repo = LikeRepository::new(&db);

        repo.toggle(&first, &addr(2)).unwrap();
        repo.toggle(&first, &addr(3)).unwrap();
        repo.toggle(&second, &addr(2)).unwrap();

        assert_eq!(repo.count(&first).unwrap(), 2);
        assert_eq!(repo.count(&second).unwrap(), 1);
    }

    #[test]
    fn toggle_on_missing_content_is_not_found() {
        let (db, _dir) = temp_db();
        let repo = LikeRepository::new(&db);
        let err = repo.toggle("no-such-content", &addr(2)).unwrap_err();
        assert!(matches!(err, DbError::NotFound(ref what) if what == "Content"));
        assert_eq!(repo.count("no-such-content").unwrap(), 0);
    }

    #[test]
    fn concurrent_toggles_never_duplicate() {
        let (db, _dir) = temp_db();
        let id = seed_content(&db);
        let db = std::sync::Arc::new(db);
        let user = addr(4);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                let id = id.clone();
                let user = user.clone();
                std::thread::spawn(move || LikeRepository::new(&db).toggle(&id, &user).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // An even number of toggles always lands back on "not liked".
        let repo = LikeRepository::new(&db);
        assert_eq!(repo.count(&id).unwrap(), 0);
    }
}
