//! Importer (C6): streaming replay of an externally supplied block range.
//!
//! The per-task MRU is constructed locally to this call and discarded at
//! the end, matching `qc-02-block-storage`'s convention of keeping
//! task-scoped buffers as plain owned values rather than ambient state
//! (see `domain::hot_cache::TaskCache`'s doc comment).

use std::sync::Arc;

use shared_types::Hash;
use tracing::{info, warn};

use crate::actor::ChainActorHandle;
use crate::domain::block::Block;
use crate::domain::errors::{ChainError, ChainResult};
use crate::domain::hot_cache::TaskCache;
use crate::domain::value_objects::ChainManagerConfig;
use crate::ports::inbound::ChainManagerApi;
use crate::ports::outbound::BlockValidator;
use crate::sync_coordinator::SyncCoordinator;

/// Outcome of a completed (or halted) import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub final_block: Option<Hash>,
    pub installed: u64,
    pub skipped: u64,
}

pub struct Importer {
    handle: ChainActorHandle,
    validator: Arc<dyn BlockValidator>,
    sync: Arc<SyncCoordinator>,
    config: ChainManagerConfig,
}

impl Importer {
    #[must_use]
    pub fn new(
        handle: ChainActorHandle,
        validator: Arc<dyn BlockValidator>,
        sync: Arc<SyncCoordinator>,
        config: ChainManagerConfig,
    ) -> Self {
        Self {
            handle,
            validator,
            sync,
            config,
        }
    }

    /// Replay `source` (an ordered sequence of blocks, from file or peer)
    /// against the chain. Halts on the first validation failure; blocks
    /// installed before the failure are not rolled back.
    pub async fn import_blocks(&self, source: Vec<Block>) -> ChainResult<ImportReport> {
        let mut task_cache = TaskCache::new(self.config.task_cache_size);
        let mut skipped = 0u64;
        let mut installed = 0u64;

        let mut iter = source.into_iter().peekable();

        // Step 1: drop the leading prefix already known by hash.
        while let Some(block) = iter.peek() {
            if self.handle.block_by_hash(block.hash()).await?.is_some() {
                iter.next();
                skipped += 1;
            } else {
                break;
            }
        }

        let Some(first_remaining) = iter.peek().cloned() else {
            self.sync.finish_sync().await;
            info!(skipped, "import had nothing left to replay");
            return Ok(ImportReport {
                final_block: None,
                installed,
                skipped,
            });
        };

        // Step 2: bind `prev` through the normal read path.
        let mut prev = self
            .handle
            .block_by_hash(first_remaining.parent_hash())
            .await?;
        let mut final_hash = None;

        // Step 3: validate and submit each remaining block in order.
        for block in iter {
            if let Some(existing) = self.handle.block_by_hash(block.hash()).await? {
                task_cache.put(existing.hash(), Arc::new(existing.clone()));
                final_hash = Some(existing.hash());
                prev = Some(existing);
                skipped += 1;
                continue;
            }

            let prev_block = prev.clone().ok_or_else(|| ChainError::ValidationFailure {
                reason: format!(
                    "no parent available to validate block at height {}",
                    block.number()
                ),
            })?;

            let validated = self.validator.validate(&block, &prev_block).map_err(|reason| {
                warn!(reason = %reason, height = block.number(), "import validation failed, halting");
                ChainError::ValidationFailure { reason }
            })?;

            self.handle
                .add_block(validated.clone(), false, false)
                .await?;

            task_cache.put(validated.hash(), Arc::new(validated.clone()));
            final_hash = Some(validated.hash());
            prev = Some(validated);
            installed += 1;
        }

        // Step 4: drop the active-sync election and publish {syncing, false}.
        self.sync.finish_sync().await;

        info!(installed, skipped, "import run complete");
        Ok(ImportReport {
            final_block: final_hash,
            installed,
            skipped,
        })
    }
}
