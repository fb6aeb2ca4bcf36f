//! `ChainState`: the actor-owned singleton.
//!
//! `peak_epoch` is a single-word atomic published by the actor and read
//! lock-free by anyone holding a handle, mirroring how `qc-09-finality`
//! publishes its circuit-breaker state for cheap reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::block::Block;

/// Owned exclusively by the Chain Actor; no other component may mutate it.
#[derive(Clone)]
pub struct ChainState {
    peak: Arc<Block>,
    peak_epoch: Arc<AtomicU64>,
}

impl ChainState {
    #[must_use]
    pub fn new(genesis: Block) -> Self {
        let epoch = genesis.epoch();
        Self {
            peak: Arc::new(genesis),
            peak_epoch: Arc::new(AtomicU64::new(epoch)),
        }
    }

    #[must_use]
    pub fn peak(&self) -> Arc<Block> {
        self.peak.clone()
    }

    pub fn set_peak(&mut self, block: Arc<Block>) {
        self.peak_epoch.store(block.epoch(), Ordering::Release);
        self.peak = block;
    }

    /// Cheap, lock-free read of the cached epoch, kept in a shared
    /// atomic slot for O(1) access without locking the peak.
    #[must_use]
    pub fn peak_epoch_handle(&self) -> Arc<AtomicU64> {
        self.peak_epoch.clone()
    }

    #[must_use]
    pub fn peak_epoch(&self) -> u64 {
        self.peak_epoch.load(Ordering::Acquire)
    }
}
