//! Outbound ports (SPI): everything the Chain Manager depends on but
//! does not own.
//!
//! Shaped after `qc-02-block-storage::ports::outbound::KeyValueStore`
//! (object-safe traits, `Send + Sync`, `ChainResult`-returning methods,
//! with an in-memory fake colocated for tests).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use shared_types::Hash;

use crate::domain::block::Block;
use crate::domain::errors::ChainResult;

/// The persistent store's contract.
pub trait ChainStore: Send + Sync {
    /// Current persisted peak, or `None` if the store is empty.
    fn peak_block(&self) -> ChainResult<Option<Block>>;

    /// Atomically set `block` as peak and mark all ancestors on its
    /// branch as main (used for reorgs and `set_peak`).
    fn put_peak(&self, block: &Block) -> ChainResult<()>;

    /// Insert or overwrite `block` as a main-chain block.
    fn put_block(&self, block: &Block) -> ChainResult<()>;

    /// Insert `block` as an alt (non-main) block.
    fn put_new_block(&self, block: &Block) -> ChainResult<()>;

    /// Main-chain block at height `number`.
    fn block(&self, number: u64) -> ChainResult<Option<Block>>;

    /// Any known block (main or alt) with this hash.
    fn block_by_hash(&self, hash: &Hash) -> ChainResult<Option<Block>>;

    /// Main-chain block containing the given transaction hash.
    fn block_by_txhash(&self, tx_hash: &Hash) -> ChainResult<Option<Block>>;

    /// Descending list of up to `limit` main-chain blocks starting at `hash`.
    fn blocks_by_hash(&self, hash: &Hash, limit: usize) -> ChainResult<Vec<Block>>;

    /// Top `k` main-chain blocks by number, descending.
    fn top_blocks(&self, k: usize) -> ChainResult<Vec<Block>>;

    /// Every known block as `(hash, number)`, for index prefetch.
    fn all_block_hashes(&self) -> ChainResult<Vec<(Hash, u64)>>;

    /// Drop all alt-branch rows.
    fn clear_alt_blocks(&self) -> ChainResult<()>;

    /// Delete everything.
    fn truncate_blocks(&self) -> ChainResult<()>;
}

/// External collaborator: transaction validation and EVM execution,
/// treated as a black box. Returns the executed block on success.
pub trait BlockValidator: Send + Sync {
    fn validate(&self, candidate: &Block, prev: &Block) -> Result<Block, String>;
}

/// Pruning sink for the local mempool: removes a newly installed
/// block's transactions from the pool.
pub trait MempoolSink: Send + Sync {
    fn prune(&self, transaction_hashes: &[Hash]);
}

/// P2P relay/broadcast sink.
pub trait RelaySink: Send + Sync {
    fn broadcast(&self, bytes: &[u8]);
    fn relay(&self, bytes: &[u8]);
}

/// Debounced notification sink for the ticket subsystem.
pub trait TicketSink: Send + Sync {
    fn notify(&self, block_hash: Hash);
}

/// Signal to the miner worker that the peak changed, so it can retarget
/// whatever candidate block it was building.
pub trait MinerSink: Send + Sync {
    fn peak_changed(&self, peak: &Block);
}

/// The secondary store the exporter writes into: rows of
/// `(number PRIMARY KEY, data BLOB)`, written a chunk at a time.
pub trait ExportSink: Send + Sync {
    /// Highest block number already durably recorded, if any.
    fn highest_recorded_number(&self) -> ChainResult<Option<u64>>;

    /// Write one chunk atomically. `records` is `(number, serialized block)`.
    fn write_chunk(&self, records: &[(u64, Vec<u8>)]) -> ChainResult<()>;
}

/// In-memory `ExportSink` fake for tests.
#[derive(Default)]
pub struct InMemoryExportSink {
    rows: Mutex<BTreeMap<u64, Vec<u8>>>,
}

impl InMemoryExportSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    #[must_use]
    pub fn contains(&self, number: u64) -> bool {
        self.rows.lock().unwrap().contains_key(&number)
    }

    /// Raw serialized record for one block number, for callers replaying an
    /// export back through the wire format it was written in.
    #[must_use]
    pub fn row(&self, number: u64) -> Option<Vec<u8>> {
        self.rows.lock().unwrap().get(&number).cloned()
    }
}

impl ExportSink for InMemoryExportSink {
    fn highest_recorded_number(&self) -> ChainResult<Option<u64>> {
        Ok(self.rows.lock().unwrap().keys().next_back().copied())
    }

    fn write_chunk(&self, records: &[(u64, Vec<u8>)]) -> ChainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        for (number, payload) in records {
            rows.insert(*number, payload.clone());
        }
        Ok(())
    }
}

/// In-memory `ChainStore` fake, mirroring
/// `qc-02-block-storage::ports::outbound::InMemoryKVStore`. Main-chain
/// rows live in `main` (keyed by number); every known block (main or
/// alt) lives in `by_hash`.
#[derive(Default)]
pub struct InMemoryChainStore {
    inner: Mutex<InMemoryChainStoreState>,
}

#[derive(Default)]
struct InMemoryChainStoreState {
    main: BTreeMap<u64, Hash>,
    by_hash: BTreeMap<Hash, Block>,
    peak: Option<Hash>,
}

impl InMemoryChainStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for InMemoryChainStore {
    fn peak_block(&self) -> ChainResult<Option<Block>> {
        let state = self.inner.lock().unwrap();
        Ok(state.peak.and_then(|hash| state.by_hash.get(&hash).cloned()))
    }

    fn put_peak(&self, block: &Block) -> ChainResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.by_hash.insert(block.hash(), block.clone());
        state.main.insert(block.number(), block.hash());
        state.peak = Some(block.hash());

        // Rewrite main-chain linkage back to the common ancestor.
        let mut cursor = block.clone();
        loop {
            state.main.insert(cursor.number(), cursor.hash());
            if cursor.number() == 0 {
                break;
            }
            let parent_hash = cursor.parent_hash();
            match state.by_hash.get(&parent_hash).cloned() {
                Some(parent) => {
                    let already_main = state.main.get(&parent.number()) == Some(&parent_hash);
                    cursor = parent;
                    if already_main {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(())
    }

    fn put_block(&self, block: &Block) -> ChainResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.by_hash.insert(block.hash(), block.clone());
        state.main.insert(block.number(), block.hash());
        Ok(())
    }

    fn put_new_block(&self, block: &Block) -> ChainResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.by_hash.insert(block.hash(), block.clone());
        Ok(())
    }

    fn block(&self, number: u64) -> ChainResult<Option<Block>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .main
            .get(&number)
            .and_then(|hash| state.by_hash.get(hash).cloned()))
    }

    fn block_by_hash(&self, hash: &Hash) -> ChainResult<Option<Block>> {
        let state = self.inner.lock().unwrap();
        Ok(state.by_hash.get(hash).cloned())
    }

    fn block_by_txhash(&self, tx_hash: &Hash) -> ChainResult<Option<Block>> {
        let state = self.inner.lock().unwrap();
        for hash in state.main.values() {
            if let Some(block) = state.by_hash.get(hash) {
                if block
                    .transactions
                    .iter()
                    .any(|tx| &tx.tx_hash == tx_hash)
                {
                    return Ok(Some(block.clone()));
                }
            }
        }
        Ok(None)
    }

    fn blocks_by_hash(&self, hash: &Hash, limit: usize) -> ChainResult<Vec<Block>> {
        let state = self.inner.lock().unwrap();
        let mut out = Vec::new();
        let mut current = state.by_hash.get(hash).cloned();
        while let Some(block) = current {
            out.push(block.clone());
            if out.len() >= limit || block.number() == 0 {
                break;
            }
            current = state.by_hash.get(&block.parent_hash()).cloned();
        }
        Ok(out)
    }

    fn top_blocks(&self, k: usize) -> ChainResult<Vec<Block>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .main
            .iter()
            .rev()
            .take(k)
            .filter_map(|(_, hash)| state.by_hash.get(hash).cloned())
            .collect())
    }

    fn all_block_hashes(&self) -> ChainResult<Vec<(Hash, u64)>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .by_hash
            .values()
            .map(|block| (block.hash(), block.number()))
            .collect())
    }

    fn clear_alt_blocks(&self) -> ChainResult<()> {
        let mut state = self.inner.lock().unwrap();
        let main_hashes: std::collections::HashSet<Hash> = state.main.values().copied().collect();
        state.by_hash.retain(|hash, _| main_hashes.contains(hash));
        Ok(())
    }

    fn truncate_blocks(&self) -> ChainResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.main.clear();
        state.by_hash.clear();
        state.peak = None;
        Ok(())
    }
}

/// No-op sinks, for tests and for nodes that disable a collaborator.
pub struct NullMempoolSink;
impl MempoolSink for NullMempoolSink {
    fn prune(&self, _transaction_hashes: &[Hash]) {}
}

pub struct NullRelaySink;
impl RelaySink for NullRelaySink {
    fn broadcast(&self, _bytes: &[u8]) {}
    fn relay(&self, _bytes: &[u8]) {}
}

pub struct NullTicketSink;
impl TicketSink for NullTicketSink {
    fn notify(&self, _block_hash: Hash) {}
}

pub struct NullMinerSink;
impl MinerSink for NullMinerSink {
    fn peak_changed(&self, _peak: &Block) {}
}

/// Accepting validator for tests: returns the candidate unchanged.
pub struct AcceptingValidator;
impl BlockValidator for AcceptingValidator {
    fn validate(&self, candidate: &Block, _prev: &Block) -> Result<Block, String> {
        Ok(candidate.clone())
    }
}
