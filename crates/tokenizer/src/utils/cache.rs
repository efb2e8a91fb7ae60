//! Encoding cache for repeated segments.
//!
//! Words repeat heavily across a batch, so the tokenizer keeps an LRU cache
//! from byte-mapped segment to its resolved ids. A capacity of 0 disables it.

use ahash::AHashMap;
use compact_str::CompactString;
use std::collections::VecDeque;

/// LRU cache for encoding results.
///
/// When the cache exceeds capacity, the least recently used entry is evicted.
#[derive(Debug)]
pub struct EncodingCache {
    /// The cache storing segment -> encoded tokens
    cache: AHashMap<CompactString, Vec<u32>>,
    /// Maximum number of entries in the cache
    capacity: usize,
    /// Usage order, least recent first
    order: VecDeque<CompactString>,
    hits: u64,
    misses: u64,
}

impl EncodingCache {
    /// Create a new encoding cache with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: AHashMap::with_capacity(capacity),
            capacity,
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a new encoding cache with default capacity (1000).
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Look up a segment, marking it most recently used on a hit.
    ///
    /// Always misses, without counting, when the cache is disabled.
    pub fn get(&mut self, segment: &str) -> Option<Vec<u32>> {
        if self.capacity == 0 {
            return None;
        }

        match self.cache.get(segment).cloned() {
            Some(cached) => {
                self.hits += 1;
                self.touch(segment);
                Some(cached)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the ids of a segment, evicting the least recently used entry
    /// when full. A segment already present is only touched.
    pub fn insert(&mut self, segment: &str, ids: Vec<u32>) {
        if self.capacity == 0 {
            return;
        }
        if self.cache.contains_key(segment) {
            self.touch(segment);
            return;
        }

        while self.order.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.cache.remove(&oldest);
                }
                None => break,
            }
        }

        let key = CompactString::new(segment);
        self.order.push_back(key.clone());
        self.cache.insert(key, ids);
    }

    fn touch(&mut self, segment: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == segment) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.cache.len(),
            capacity: self.capacity,
            hit_rate: (lookups > 0).then(|| self.hits as f64 / lookups as f64),
        }
    }
}

impl Default for EncodingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Cache hit rate (None before the first lookup)
    pub hit_rate: Option<f64>,
}
