// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Comment repository.
//!
//! Soft-deleted comments keep their row in `comments` (with `deleted = true`)
//! but lose their `comments_by_content` index entry, so listings only ever
//! see live comments.

use chrono::Utc;
use redb::ReadableTable;
use uuid::Uuid;

use super::super::database::{
    id_from_index_key, prefix_range, time_index_key, Database, DbError, DbResult, COMMENTS,
    COMMENTS_BY_CONTENT, CONTENT,
};
use crate::models::{Comment, WalletAddress};

/// One page of live comments plus the total number of live comments.
#[derive(Debug, Clone)]
pub struct CommentPage {
    pub items: Vec<Comment>,
    pub total: u64,
}

pub struct CommentRepository<'a> {
    db: &'a Database,
}

impl<'a> CommentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a comment to existing content.
    pub fn create(&self, content_id: &str, address: &WalletAddress, text: String) -> DbResult<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            content_id: content_id.to_string(),
            address: address.clone(),
            text,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_vec(&comment)?;

        let write_txn = self.db.begin_write()?;
        {
            let content = write_txn.open_table(CONTENT)?;
            if content.get(content_id)?.is_none() {
                return Err(DbError::NotFound("Content".to_string()));
            }

            let mut comments = write_txn.open_table(COMMENTS)?;
            comments.insert(comment.id.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(COMMENTS_BY_CONTENT)?;
            let key = time_index_key(content_id, comment.created_at, &comment.id);
            index.insert(key.as_slice(), ())?;
        }
        write_txn.commit()?;

        tracing::debug!(comment_id = %comment.id, content_id, "Comment created");
        Ok(comment)
    }

    /// Fetch a comment by id, including soft-deleted ones.
    pub fn get(&self, id: &str) -> DbResult<Option<Comment>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COMMENTS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Live comments on a piece of content, newest first.
    pub fn list_for_content(&self, content_id: &str, offset: usize, limit: usize) -> DbResult<CommentPage> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(COMMENTS_BY_CONTENT)?;
        let comments = read_txn.open_table(COMMENTS)?;

        let (start, end) = prefix_range(content_id);
        let mut total = 0u64;
        let mut items = Vec::with_capacity(limit);
        for entry in index.range(start.as_slice()..end.as_slice())? {
            let (key, _) = entry?;
            let position = total as usize;
            total += 1;
            if position < offset || items.len() >= limit {
                continue;
            }

            let id = id_from_index_key(key.value())
                .ok_or_else(|| DbError::Corrupt("comment index key".to_string()))?;
            match comments.get(id.as_str())? {
                Some(value) => items.push(serde_json::from_slice(value.value())?),
                None => {
                    tracing::warn!(comment_id = %id, "Index entry without comment row");
                    total -= 1;
                }
            }
        }

        Ok(CommentPage { items, total })
    }

    /// Replace the text of a live comment.
    pub fn update_text(&self, id: &str, text: String) -> DbResult<Comment> {
        let write_txn = self.db.begin_write()?;
        let comment = {
            let mut table = write_txn.open_table(COMMENTS)?;
            let mut comment: Comment = match table.get(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(DbError::NotFound("Comment".to_string())),
            };
            if comment.deleted {
                return Err(DbError::NotFound("Comment".to_string()));
            }

            comment.text = text;
            comment.updated_at = Utc::now();
            let json = serde_json::to_vec(&comment)?;
            table.insert(id, json.as_slice())?;
            comment
        };
        write_txn.commit()?;
        Ok(comment)
    }

    /// Mark a comment deleted and drop it from the content listing.
    pub fn soft_delete(&self, id: &str) -> DbResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(COMMENTS)?;
            let mut comment: Comment = match table.get(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => return Err(DbError::NotFound("Comment".to_string())),
            };
            if comment.deleted {
                return Err(DbError::NotFound("Comment".to_string()));
            }

            comment.deleted = true;
            comment.updated_at = Utc::now();
            let json = serde_json::to_vec(&comment)?;
            table.insert(id, json.as_slice())?;

            let mut index = write_txn.open_table(COMMENTS_BY_CONTENT)?;
            let key = time_index_key(&comment.content_id, comment.created_at, &comment.id);
            index.remove(key.as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!(comment_id = id, "Comment soft-deleted");
        Ok(())
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
                category: Category::Article,
                title: "Essay".into(),
                description: Some("About things".into()),
                media_url: "/uploads/essay.pdf".into(),
                thumbnail_url: None,
            })
            .unwrap()
            .id
    }

    #[test]
    fn create_requires_existing_content() {
        let (db, _dir) = temp_db();
        let repo = CommentRepository::new(&db);
        let err = repo.create("missing", &addr(2), "hi".into()).unwrap_err();
        assert!(matches!(err, DbError::NotFound(ref what) if what == "Content"));
    }

    #[test]
    fn list_is_newest_first_and_excludes_deleted() {
        let (db, _dir) = temp_db();
        let content_id = seed_content(&db);
        let repo = CommentRepository::new(&db);

        let first = repo.create(&content_id, &addr(2), "first".into()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = repo.create(&content_id, &addr(3), "second".into()).unwrap();

        let page = repo.list_for_content(&content_id, 0, 50).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, second.id);
        assert_eq!(page.items[1].id, first.id);

        repo.soft_delete(&second.id).unwrap();
        let page = repo.list_for_content(&content_id, 0, 50).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, first.id);

        // The row itself is retained.
        let stored = repo.get(&second.id).unwrap().unwrap();
        assert!(stored.deleted);
    }

    #[test]
    fn deleted_comment_cannot_be_updated_or_deleted_again() {
        let (db, _dir) = temp_db();
        let content_id = seed_content(&db);
        let repo = CommentRepository::new(&db);
        let comment = repo.create(&content_id, &addr(2), "hello".into()).unwrap();

        let updated = repo.update_text(&comment.id, "hello again".into()).unwrap();
        assert_eq!(updated.text, "hello again");
        assert!(updated.updated_at >= comment.updated_at);

        repo.soft_delete(&comment.id).unwrap();
        assert!(matches!(repo.soft_delete(&comment.id), Err(DbError::NotFound(_))));
        assert!(matches!(
            repo.update_text(&comment.id, "late".into()),
            Err(DbError::NotFound(_))
        ));
    }
}
