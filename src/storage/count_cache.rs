// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for like counts.
//!
//! `GET /likes/count/{id}` is the hottest read on the platform; counts are
//! kept for a short TTL and invalidated whenever the like set changes.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

struct CacheEntry {
    count: u64,
    inserted_at: Instant,
}

/// In-process LRU cache keyed by content id.
pub struct LikeCountCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl LikeCountCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Cached count for `content_id`, or `None` if absent or expired.
    pub fn get(&self, content_id: &str) -> Option<u64> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(content_id) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.count);
            }
            cache.pop(content_id);
        }
        None
    }

    pub fn put(&self, content_id: &str, count: u64) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                content_id.to_string(),
                CacheEntry {
                    count,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn invalidate(&self, content_id: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(content_id);
        }
    }
}

impl Default for LikeCountCache {
    fn default() -> Self {
        Self::new(1024, Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_and_invalidate() {
        let cache = LikeCountCache::new(10, Duration::from_secs(300));
        assert!(cache.get("c1").is_none());

        cache.put("c1", 7);
        assert_eq!(cache.get("c1"), Some(7));

        cache.invalidate("c1");
        assert!(cache.get("c1").is_none());
    }

    #[test]
    fn entries_expire() {
        let cache = LikeCountCache::new(10, Duration::from_millis(1));
        cache.put("c1", 3);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("c1").is_none());
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = LikeCountCache::new(2, Duration::from_secs(300));
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.put("c", 3);

        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = LikeCountCache::new(0, Duration::from_secs(300));
        cache.put("a", 1);
        assert_eq!(cache.get("a"), Some(1));
    }
}
