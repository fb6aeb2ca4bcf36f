//! Hot Cache (C2): a per-task MRU plus a process-wide LRU.
//!
//! The per-task cache is threaded explicitly through the importer rather
//! than held in a `tokio::task_local!`, so it stays a plain,
//! independently testable value the way `qc-02-block-storage` keeps its
//! `BlockAssemblyBuffer` a constructor-owned field rather than ambient
//! state. The shared LRU mirrors `tos-network-tos`'s `ChainCache`
//! (`lru::LruCache` behind a `Mutex`).

use lru::LruCache;
use parking_lot::Mutex;
use shared_types::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::block::Block;

/// Per-task bounded MRU, capacity-limited, not thread-safe by design:
/// callers own one per call scope (an importer run, a single read
/// operation's callee chain) and never share it across tasks.
pub struct TaskCache {
    capacity: usize,
    entries: Vec<(Hash, Arc<Block>)>,
}

impl TaskCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&mut self, hash: &Hash) -> Option<Arc<Block>> {
        if let Some(pos) = self.entries.iter().position(|(h, _)| h == hash) {
            let entry = self.entries.remove(pos);
            let block = entry.1.clone();
            self.entries.push(entry);
            Some(block)
        } else {
            None
        }
    }

    pub fn put(&mut self, hash: Hash, block: Arc<Block>) {
        if let Some(pos) = self.entries.iter().position(|(h, _)| *h == hash) {
            self.entries.remove(pos);
        } else if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push((hash, block));
    }

    /// Fetch through the cache, calling `loader` on miss and caching the
    /// result if present.
    pub fn get_or_load(
        &mut self,
        hash: Hash,
        loader: impl FnOnce() -> Option<Arc<Block>>,
    ) -> Option<Arc<Block>> {
        if let Some(hit) = self.get(&hash) {
            return Some(hit);
        }
        let loaded = loader()?;
        self.put(hash, loaded.clone());
        Some(loaded)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide bounded LRU shared by all readers, for SQL-miss
/// amortization.
pub struct SharedBlockCache {
    inner: Mutex<LruCache<Hash, Arc<Block>>>,
}

impl SharedBlockCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn get(&self, hash: &Hash) -> Option<Arc<Block>> {
        self.inner.lock().get(hash).cloned()
    }

    pub fn put(&self, hash: Hash, block: Arc<Block>) {
        self.inner.lock().put(hash, block);
    }

    pub fn get_or_load(
        &self,
        hash: Hash,
        loader: impl FnOnce() -> Option<Arc<Block>>,
    ) -> Option<Arc<Block>> {
        if let Some(hit) = self.get(&hash) {
            return Some(hit);
        }
        let loaded = loader()?;
        self.put(hash, loaded.clone());
        Some(loaded)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
