//! # Analysis Cache
//!
//! Bounded memoization of title analyses, keyed by normalized title text.
//! Eviction is insertion-order (FIFO), not LRU: the cache exists to protect
//! the upstream quota, and the bookkeeping stays a map plus a deque. A
//! re-inserted key keeps its original slot in the eviction queue.
//!
//! Rebuilt empty at process start; no TTL.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::analyze::AnalysisResult;

/// Default capacity, matching the dashboard's historical limit.
pub const DEFAULT_CAPACITY: usize = 50;

/// Thread-safe bounded cache of [`AnalysisResult`]s.
#[derive(Debug)]
pub struct AnalysisCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Inner {
    map: HashMap<String, AnalysisResult>,
    /// Keys in insertion order; the front is the eviction candidate.
    order: VecDeque<String>,
}

impl AnalysisCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Lookup key: surrounding whitespace stripped, lowercased. Titles that
    /// differ only in case or padding collide intentionally.
    pub fn normalize_key(title: &str) -> String {
        title.trim().to_lowercase()
    }

    pub fn get(&self, title: &str) -> Option<AnalysisResult> {
        let key = Self::normalize_key(title);
        let inner = self.inner.lock().expect("analysis cache mutex poisoned");
        inner.map.get(&key).cloned()
    }

    /// Insert or replace. A replaced key keeps its insertion slot; a new key
    /// evicts the oldest entry once capacity is exceeded.
    pub fn put(&self, title: &str, result: AnalysisResult) {
        let key = Self::normalize_key(title);
        let mut inner = self.inner.lock().expect("analysis cache mutex poisoned");
        if inner.map.insert(key.clone(), result).is_none() {
            inner.order.push_back(key);
            while inner.map.len() > self.capacity {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.map.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("analysis cache mutex poisoned")
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("analysis cache mutex poisoned");
        inner.map.clear();
        inner.order.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
