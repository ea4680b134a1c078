// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Content repository.
//!
//! Content rows are stored as JSON under their id, with three secondary
//! indexes (global, per creator, per category) ordered newest first.

use chrono::Utc;
use redb::{ReadableTable, TableDefinition};
use uuid::Uuid;

use super::super::database::{
    id_from_index_key, prefix_range, time_index_key, Database, DbError, DbResult, CONTENT,
    CONTENT_BY_CATEGORY, CONTENT_BY_CREATOR, CONTENT_BY_TIME,
};
use crate::models::{Category, Content, NewContent, WalletAddress};

/// Optional filters applied to content listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub category: Option<Category>,
    pub creator: Option<WalletAddress>,
}

/// One page of content plus the total number of matches.
#[derive(Debug, Clone)]
pub struct ContentPage {
    pub items: Vec<Content>,
    pub total: u64,
}

pub struct ContentRepository<'a> {
    db: &'a Database,
}

impl<'a> ContentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new content record and its index entries.
    pub fn create(&self, new: NewContent) -> DbResult<Content> {
        let now = Utc::now();
        let content = Content {
            id: Uuid::new_v4().to_string(),
            creator_address: new.creator_address,
            category: new.category,
            title: new.title,
            description: new.description,
            media_url: new.media_url,
            thumbnail_url: new.thumbnail_url,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_vec(&content)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONTENT)?;
            if table.get(content.id.as_str())?.is_some() {
                return Err(DbError::Conflict(format!("content {}", content.id)));
            }
            table.insert(content.id.as_str(), json.as_slice())?;

            let mut by_time = write_txn.open_table(CONTENT_BY_TIME)?;
            let key = time_index_key("", content.created_at, &content.id);
            by_time.insert(key.as_slice(), ())?;

            let mut by_creator = write_txn.open_table(CONTENT_BY_CREATOR)?;
            let key = time_index_key(content.creator_address.as_str(), content.created_at, &content.id);
            by_creator.insert(key.as_slice(), ())?;

            let mut by_category = write_txn.open_table(CONTENT_BY_CATEGORY)?;
            let key = time_index_key(content.category.as_str(), content.created_at, &content.id);
            by_category.insert(key.as_slice(), ())?;
        }
        write_txn.commit()?;

        tracing::debug!(content_id = %content.id, creator = %content.creator_address, "Content created");
        Ok(content)
    }

    /// Look up content by id.
    pub fn get(&self, id: &str) -> DbResult<Option<Content>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONTENT)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, id: &str) -> DbResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONTENT)?;
        Ok(table.get(id)?.is_some())
    }

    /// List content newest first, skipping `offset` matches and returning at
    /// most `limit`.
    pub fn list(&self, filter: &ContentFilter, offset: usize, limit: usize) -> DbResult<ContentPage> {
        let read_txn = self.db.begin_read()?;
        let content = read_txn.open_table(CONTENT)?;

        // The creator index is the narrowest; a category filter on top of it
        // is applied to the loaded rows.
        let (index, prefix): (TableDefinition<&[u8], ()>, Option<&str>) =
            match (&filter.creator, filter.category) {
                (Some(creator), _) => (CONTENT_BY_CREATOR, Some(creator.as_str())),
                (None, Some(category)) => (CONTENT_BY_CATEGORY, Some(category.as_str())),
                (None, None) => (CONTENT_BY_TIME, None),
            };
        let post_filter = filter.creator.as_ref().and(filter.category);

        let index = read_txn.open_table(index)?;
        let keys: Vec<Vec<u8>> = match prefix {
            Some(prefix) => {
                let (start, end) = prefix_range(prefix);
                let mut keys = Vec::new();
                for entry in index.range(start.as_slice()..end.as_slice())? {
                    keys.push(entry?.0.value().to_vec());
                }
                keys
            }
            None => {
                let mut keys = Vec::new();
                for entry in index.iter()? {
                    keys.push(entry?.0.value().to_vec());
                }
                keys
            }
        };

        let mut total = 0u64;
        let mut items = Vec::with_capacity(limit);
        for key in keys {
            let id = id_from_index_key(&key)
                .ok_or_else(|| DbError::Corrupt("content index key".to_string()))?;

            // Without a post filter every index entry is a match and only the
            // requested page needs to be loaded.
            if post_filter.is_none() {
                let position = total as usize;
                total += 1;
                if position < offset || items.len() >= limit {
                    continue;
                }
            }

            let Some(value) = content.get(id.as_str())? else {
                tracing::warn!(content_id = %id, "Index entry without content row");
                if post_filter.is_none() {
                    total -= 1;
                }
                continue;
            };
            let record: Content = serde_json::from_slice(value.value())?;

            if let Some(category) = post_filter {
                if record.category != category {
                    continue;
                }
                let position = total as usize;
                total += 1;
                if position < offset || items.len() >= limit {
                    continue;
                }
            }
            items.push(record);
        }

        Ok(ContentPage { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::temp_db;

    fn creator(n: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}", format!("{n:02x}").repeat(20))).unwrap()
    }

    fn new_content(creator: WalletAddress, category: Category, title: &str) -> NewContent {
        NewContent {
            creator_address: creator,
            category,
            title: title.to_string(),
            description: None,
            media_url: format!("/uploads/{title}.bin"),
            thumbnail_url: None,
        }
    }

    #[test]
    fn create_and_get() {
        let (db, _dir) = temp_db();
        let repo = ContentRepository::new(&db);

        let created = repo.create(new_content(creator(1), Category::Music, "Song")).unwrap();
        assert!(Uuid::parse_str(&created.id).is_ok());

        let fetched = repo.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.exists(&created.id).unwrap());
        assert!(repo.get("missing").unwrap().is_none());
    }

    #[test]
    fn list_is_newest_first_and_paginated() {
        let (db, _dir) = temp_db();
        let repo = ContentRepository::new(&db);

        for i in 0..5 {
            repo.create(new_content(creator(1), Category::Art, &format!("piece-{i}")))
                .unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let page = repo.list(&ContentFilter::default(), 0, 2).unwrap();
        assert_eq!(page.total, 5);
        let titles: Vec<_> = page.items.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["piece-4", "piece-3"]);

        let last = repo.list(&ContentFilter::default(), 4, 2).unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].title, "piece-0");
    }

    #[test]
    fn list_filters_by_category_and_creator() {
        let (db, _dir) = temp_db();
        let repo = ContentRepository::new(&db);

        repo.create(new_content(creator(1), Category::Music, "a")).unwrap();
        repo.create(new_content(creator(1), Category::Video, "b")).unwrap();
        repo.create(new_content(creator(2), Category::Music, "c")).unwrap();

        let music = ContentFilter {
            category: Some(Category::Music),
            creator: None,
        };
        assert_eq!(repo.list(&music, 0, 10).unwrap().total, 2);

        let by_creator = ContentFilter {
            category: None,
            creator: Some(creator(1)),
        };
        assert_eq!(repo.list(&by_creator, 0, 10).unwrap().total, 2);

        let both = ContentFilter {
            category: Some(Category::Music),
            creator: Some(creator(1)),
        };
        let page = repo.list(&both, 0, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "a");
    }

    #[test]
    fn offset_past_end_returns_empty_page_with_total() {
        let (db, _dir) = temp_db();
        let repo = ContentRepository::new(&db);
        repo.create(new_content(creator(3), Category::Business, "x")).unwrap();

        let page = repo.list(&ContentFilter::default(), 20, 20).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }
}
