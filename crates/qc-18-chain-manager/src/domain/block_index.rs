//! Block Index (C1): two logical tables, hash-keyed and number-keyed,
//! sharing one concurrent map so a single read lock covers both lookups.
//!
//! Grounded on the sharded-lock read/write split `dashmap::DashMap`
//! already gives `qc-16-api-gateway::domain::pending::PendingRequestStore`,
//! generalized here to the Chain Manager's single-writer rule: only the
//! Chain Actor (C4) ever calls the mutating methods below.

use dashmap::DashMap;
use shared_types::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::block::Block;

/// Union key over hash-indexed and number-indexed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKey {
    ByHash(Hash),
    ByNumber(u64),
}

/// A hash-keyed row: either the full block or a marker that the hash is
/// known but not resident.
#[derive(Debug, Clone)]
pub enum Entry {
    FullBlock(Arc<Block>),
    Placeholder,
}

impl Entry {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Entry::Placeholder)
    }

    #[must_use]
    pub fn as_full_block(&self) -> Option<&Arc<Block>> {
        match self {
            Entry::FullBlock(block) => Some(block),
            Entry::Placeholder => None,
        }
    }
}

/// The Block Index. `by_hash` and `by_number` are independent maps so a
/// number lookup never contends with a hash lookup, but both are mutated
/// only from the actor task.
pub struct BlockIndex {
    by_hash: DashMap<Hash, Entry>,
    by_number: DashMap<u64, Hash>,
    placeholder_complete: AtomicBool,
}

impl BlockIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_hash: DashMap::new(),
            by_number: DashMap::new(),
            placeholder_complete: AtomicBool::new(false),
        }
    }

    /// Unconditional upsert of a resident full block.
    pub fn put_full(&self, hash: Hash, block: Arc<Block>) {
        self.by_hash.insert(hash, Entry::FullBlock(block));
    }

    /// Unconditional upsert of a known-but-not-resident hash.
    pub fn put_placeholder(&self, hash: Hash) {
        self.by_hash.insert(hash, Entry::Placeholder);
    }

    /// Unconditional upsert of a main-chain number -> hash row.
    pub fn put_number(&self, number: u64, hash: Hash) {
        self.by_number.insert(number, hash);
    }

    /// Look up either table through the union key.
    #[must_use]
    pub fn lookup(&self, key: IndexKey) -> Option<LookupResult> {
        match key {
            IndexKey::ByHash(hash) => self
                .by_hash
                .get(&hash)
                .map(|entry| LookupResult::Hash(entry.clone())),
            IndexKey::ByNumber(number) => self
                .by_number
                .get(&number)
                .map(|hash| LookupResult::Number(*hash)),
        }
    }

    #[must_use]
    pub fn get_by_hash(&self, hash: &Hash) -> Option<Entry> {
        self.by_hash.get(hash).map(|e| e.clone())
    }

    #[must_use]
    pub fn get_hash_at_number(&self, number: u64) -> Option<Hash> {
        self.by_number.get(&number).map(|h| *h)
    }

    #[must_use]
    pub fn contains_hash(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Demote the main-chain entry at `number` to `Placeholder` without
    /// removing the number -> hash row.
    pub fn evict_number(&self, number: u64) {
        if let Some(hash) = self.by_number.get(&number).map(|h| *h) {
            self.by_hash.insert(hash, Entry::Placeholder);
        }
    }

    pub fn clear_all(&self) {
        self.by_hash.clear();
        self.by_number.clear();
    }

    #[must_use]
    pub fn placeholder_complete(&self) -> bool {
        self.placeholder_complete.load(Ordering::Acquire)
    }

    pub fn set_placeholder_complete(&self, value: bool) {
        self.placeholder_complete.store(value, Ordering::Release);
    }

    #[must_use]
    pub fn full_block_count(&self) -> usize {
        self.by_hash
            .iter()
            .filter(|entry| matches!(entry.value(), Entry::FullBlock(_)))
            .count()
    }
}

impl Default for BlockIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum LookupResult {
    Hash(Entry),
    Number(Hash),
}
