//! Session-scoped page cache keyed by (query, page).
//!
//! Pages are only comparable within one query term, so the cache holds pages
//! for a single active query at a time: observing a different query clears it
//! wholesale.

use std::collections::HashMap;

use crate::config::CacheConfig;
use crate::models::{NavigationState, PageResult};

/// (query, page) identity of a cached page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub query: String,
    pub page: u32,
}

impl CacheKey {
    pub fn new(query: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            page,
        }
    }
}

impl From<&NavigationState> for CacheKey {
    fn from(state: &NavigationState) -> Self {
        Self::new(state.query(), state.page())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}#{}", self.query, self.page)
    }
}

/// Counters describing cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Whether caching is enabled
    pub enabled: bool,
    /// Pages currently stored
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Wholesale clears, from query changes or count mismatches
    pub invalidations: u64,
}

/// Stores fetched pages for the active query
#[derive(Debug, Clone)]
pub struct PageCache {
    enabled: bool,
    active_query: Option<String>,
    entries: HashMap<CacheKey, PageResult>,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

impl PageCache {
    /// Create an enabled cache
    pub fn new() -> Self {
        Self::from_config(&CacheConfig::default())
    }

    /// Create a cache with the given config
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            active_query: None,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
            invalidations: 0,
        }
    }

    /// Check if caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a page; returns a copy so the stored entry stays private
    pub fn get(&mut self, key: &CacheKey) -> Option<PageResult> {
        if !self.enabled {
            return None;
        }

        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                tracing::debug!("Cache HIT for {}", key);
                Some(result.clone())
            }
            None => {
                self.misses += 1;
                tracing::debug!("Cache MISS for {}", key);
                None
            }
        }
    }

    /// Read-only lookup that does not touch the counters
    pub fn peek(&self, key: &CacheKey) -> Option<&PageResult> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key)
    }

    /// Store a page.
    ///
    /// Every page of one query must report the same `total_count`. A page that
    /// disagrees means the catalog changed upstream, so the older pages of that
    /// query are dropped before storing it.
    pub fn put(&mut self, key: CacheKey, result: PageResult) {
        if !self.enabled {
            return;
        }

        self.observe_query(&key.query);

        let mismatch = self
            .entries
            .iter()
            .any(|(k, v)| k.query == key.query && v.total_count != result.total_count);
        if mismatch {
            tracing::warn!(
                "Total count for {:?} changed to {}; dropping cached pages",
                key.query,
                result.total_count
            );
            self.clear();
        }

        tracing::debug!("Cached page {}", key);
        self.entries.insert(key, result);
    }

    /// Make `query` the active query, clearing everything if it changed.
    ///
    /// Returns whether the cache was invalidated.
    pub fn observe_query(&mut self, query: &str) -> bool {
        match self.active_query.as_deref() {
            Some(active) if active == query => false,
            Some(_) => {
                self.active_query = Some(query.to_string());
                self.invalidate_all();
                true
            }
            None => {
                self.active_query = Some(query.to_string());
                false
            }
        }
    }

    /// Clear all cached pages
    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!("Invalidating {} cached pages", self.entries.len());
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.invalidations += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            invalidations: self.invalidations,
        }
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::make_page;

    #[test]
    fn test_cache_get_put() {
        let mut cache = PageCache::new();
        let key = CacheKey::new("homer", 1);

        assert_eq!(cache.get(&key), None);
        cache.put(key.clone(), make_page(1, 20, 57));

        assert_eq!(cache.get(&key), Some(make_page(1, 20, 57)));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_cache_keys_are_distinct() {
        let mut cache = PageCache::new();
        cache.put(CacheKey::new("", 1), make_page(1, 20, 57));
        cache.put(CacheKey::new("", 2), make_page(21, 20, 57));

        assert_eq!(cache.get(&CacheKey::new("", 2)), Some(make_page(21, 20, 57)));
        assert_eq!(cache.get(&CacheKey::new("", 3)), None);
        assert_eq!(cache.get(&CacheKey::new("homer", 1)), None);
    }

    #[test]
    fn test_query_change_invalidates_everything() {
        let mut cache = PageCache::new();
        cache.put(CacheKey::new("homer", 1), make_page(1, 5, 5));

        assert!(cache.observe_query("virgil"));
        assert!(cache.is_empty());
        assert_eq!(cache.get(&CacheKey::new("homer", 1)), None);

        assert!(!cache.observe_query("virgil"));
    }

    #[test]
    fn test_put_for_other_query_switches_active_query() {
        let mut cache = PageCache::new();
        cache.put(CacheKey::new("homer", 1), make_page(1, 5, 5));
        cache.put(CacheKey::new("virgil", 1), make_page(6, 3, 3));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&CacheKey::new("homer", 1)), None);
        assert!(cache.get(&CacheKey::new("virgil", 1)).is_some());
    }

    #[test]
    fn test_count_mismatch_drops_older_pages() {
        let mut cache = PageCache::new();
        cache.put(CacheKey::new("", 1), make_page(1, 20, 57));
        cache.put(CacheKey::new("", 2), make_page(21, 20, 58));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&CacheKey::new("", 1)), None);
        assert_eq!(cache.peek(&CacheKey::new("", 2)).map(|p| p.total_count), Some(58));
    }

    #[test]
    fn test_cache_disabled() {
        let mut cache = PageCache::from_config(&CacheConfig { enabled: false });
        let key = CacheKey::new("", 1);
        cache.put(key.clone(), make_page(1, 20, 57));

        assert!(!cache.is_enabled());
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }
}
