//! Inbound port (driving port): the public API other subsystems call.
//!
//! Shaped after `qc-02-block-storage::ports::inbound::BlockStorageApi`:
//! one trait, `async_trait` because every operation may cross the actor
//! mailbox.

use async_trait::async_trait;
use shared_types::Hash;

use crate::domain::block::Block;
use crate::domain::chain_state::ChainState;
use crate::domain::errors::ChainResult;

/// Result of submitting a candidate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBlockOutcome {
    /// Installed as the new peak (main extension or reorg), or already
    /// known.
    Added,
    /// Persisted as an alt branch; peak unchanged.
    Stored,
    /// Rejected at the precondition check; nothing was enqueued.
    Rejected,
    /// `async = true`: the actor accepted the message but the caller did
    /// not wait for a result.
    Unknown,
}

#[async_trait]
pub trait ChainManagerApi: Send + Sync {
    /// Submit a candidate block.
    ///
    /// Pre-validates `has_state?(block) = true` and `number(block) >= 1`
    /// before the block ever reaches the mailbox. If `async_submit` is
    /// `true`, this posts a fire-and-forget message and always returns
    /// `Unknown`; otherwise it waits up to the actor's synchronous budget.
    async fn add_block(
        &self,
        block: Block,
        relay: bool,
        async_submit: bool,
    ) -> ChainResult<AddBlockOutcome>;

    /// Force the current peak (administrative; importer and tests only).
    async fn set_peak(&self, block: Block) -> ChainResult<()>;

    async fn peak_block(&self) -> ChainResult<Block>;

    /// Derives the last finalized block from the current peak.
    async fn final_block(&self) -> ChainResult<Block>;

    async fn peak_state(&self) -> ChainResult<ChainState>;

    /// Returns once the mailbox has drained up to this message (a fence).
    async fn sync(&self) -> ChainResult<()>;

    /// Test-only: replace the entire in-memory state, then rewrite the
    /// persistent store to match (blocks until the store is consistent).
    async fn set_state(&self, state: ChainState) -> ChainResult<()>;

    /// Test-only: reset to a fresh genesis-only state.
    async fn reset_state(&self, genesis: Block) -> ChainResult<()>;

    async fn block_by_hash(&self, hash: Hash) -> ChainResult<Option<Block>>;
}
