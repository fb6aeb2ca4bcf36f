//! Chain Actor (C4): the single-writer state machine.
//!
//! Grounded on the correlation/oneshot bridging idiom already used by
//! `qc-16-api-gateway::domain::pending::PendingRequestStore` and
//! `node-runtime::adapters::ipc_receiver::EventBusIpcReceiver`, simplified
//! to a direct mailbox: this actor has exactly one inbox, so the reply
//! channel travels with the command instead of living in a correlation-ID
//! map.

use std::sync::Arc;

use shared_bus::{BlockchainEvent, EventPublisher};
use shared_types::{Hash, PublicKey};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::block::Block;
use crate::domain::block_index::Entry;
use crate::domain::chain_state::ChainState;
use crate::domain::errors::{ChainError, ChainResult};
use crate::domain::fork_choice::{self, ForkChoiceOutcome};
use crate::domain::hot_cache::SharedBlockCache;
use crate::domain::value_objects::ChainManagerConfig;
use crate::domain::BlockIndex;
use crate::ports::inbound::{AddBlockOutcome, ChainManagerApi};
use crate::ports::outbound::{ChainStore, MempoolSink, MinerSink, RelaySink, TicketSink};

type Reply<T> = oneshot::Sender<ChainResult<T>>;

enum ChainCommand {
    AddBlock {
        block: Block,
        relay: bool,
        reply: Option<Reply<AddBlockOutcome>>,
    },
    SetPeak {
        block: Block,
        reply: Reply<()>,
    },
    PeakBlock {
        reply: Reply<Block>,
    },
    FinalBlock {
        reply: Reply<Block>,
    },
    PeakState {
        reply: Reply<ChainState>,
    },
    Sync {
        reply: Reply<()>,
    },
    SetState {
        state: ChainState,
        reply: Reply<()>,
    },
    ResetState {
        genesis: Block,
        reply: Reply<()>,
    },
}

/// Owns `ChainState` and the Block Index's write side. Spawned once as a
/// single `tokio` task, single-threaded with respect to state mutation.
pub struct ChainActor {
    state: ChainState,
    index: Arc<BlockIndex>,
    shared_cache: Arc<SharedBlockCache>,
    store: Arc<dyn ChainStore>,
    events: Arc<dyn EventPublisher>,
    mempool: Arc<dyn MempoolSink>,
    relay_sink: Arc<dyn RelaySink>,
    ticket: Arc<dyn TicketSink>,
    miner_sink: Arc<dyn MinerSink>,
    this_node_miner: PublicKey,
    config: ChainManagerConfig,
    last_ticket_notify: Option<Hash>,
}

#[allow(clippy::too_many_arguments)]
impl ChainActor {
    pub fn new(
        genesis: Block,
        index: Arc<BlockIndex>,
        shared_cache: Arc<SharedBlockCache>,
        store: Arc<dyn ChainStore>,
        events: Arc<dyn EventPublisher>,
        mempool: Arc<dyn MempoolSink>,
        relay_sink: Arc<dyn RelaySink>,
        ticket: Arc<dyn TicketSink>,
        miner_sink: Arc<dyn MinerSink>,
        this_node_miner: PublicKey,
        config: ChainManagerConfig,
    ) -> Self {
        let hash = genesis.hash();
        index.put_full(hash, Arc::new(genesis.clone()));
        index.put_number(genesis.number(), hash);
        Self {
            state: ChainState::new(genesis),
            index,
            shared_cache,
            store,
            events,
            mempool,
            relay_sink,
            ticket,
            miner_sink,
            this_node_miner,
            config,
            last_ticket_notify: None,
        }
    }

    /// Spawn the actor task and return a clonable handle.
    pub fn spawn(self) -> ChainActorHandle {
        let (tx, rx) = mpsc::channel(256);
        let index = self.index.clone();
        let shared_cache = self.shared_cache.clone();
        let store = self.store.clone();
        tokio::spawn(run(self, rx));
        ChainActorHandle {
            tx,
            index,
            shared_cache,
            store,
        }
    }

    fn handle_add_block(
        &mut self,
        block: Block,
        relay: bool,
    ) -> ChainResult<AddBlockOutcome> {
        if !block.has_state() {
            return Err(ChainError::MissingState(block.hash()));
        }
        if block.number() < 1 {
            return Err(ChainError::InvalidGenesis {
                number: block.number(),
            });
        }

        let hash = block.hash();
        let already_full = matches!(
            self.index.get_by_hash(&hash),
            Some(Entry::FullBlock(_))
        );
        let peak = self.state.peak();
        let outcome = fork_choice::decide(&block, &peak, already_full);

        match outcome {
            ForkChoiceOutcome::Duplicate => Ok(AddBlockOutcome::Added),
            ForkChoiceOutcome::AltExtension => {
                self.store
                    .put_new_block(&block)
                    .map_err(|e| ChainError::StoreFailure {
                        source: e.to_string(),
                    })?;
                self.index.put_placeholder(hash);
                crate::metrics::record_block_stored_alt();
                Ok(AddBlockOutcome::Stored)
            }
            ForkChoiceOutcome::MainExtension => {
                self.store
                    .put_block(&block)
                    .map_err(|e| ChainError::StoreFailure {
                        source: e.to_string(),
                    })?;
                let arc_block = Arc::new(block.clone());
                self.index.put_full(hash, arc_block);
                self.index.put_number(block.number(), hash);
                if block.number() >= self.config.window_size {
                    self.index.evict_number(block.number() - self.config.window_size);
                    crate::metrics::record_index_eviction();
                }
                crate::metrics::record_block_added();
                self.on_new_peak(block, relay);
                Ok(AddBlockOutcome::Added)
            }
            ForkChoiceOutcome::Reorg => {
                self.store
                    .put_peak(&block)
                    .map_err(|e| ChainError::StoreFailure {
                        source: e.to_string(),
                    })?;
                self.refetch_index(&block)?;
                crate::metrics::record_block_added();
                crate::metrics::record_reorg();
                self.on_new_peak(block, relay);
                Ok(AddBlockOutcome::Added)
            }
        }
    }

    /// Index refetch after a reorg: walk back from the new peak
    /// rewriting number -> hash entries until the index already agrees
    /// with the new main chain.
    fn refetch_index(&self, new_peak: &Block) -> ChainResult<()> {
        let store = self.store.clone();
        let path = fork_choice::reorg_path(
            new_peak,
            |parent_hash| store.block_by_hash(&parent_hash).ok().flatten(),
            |number, hash| self.index.get_hash_at_number(number) == Some(hash),
        );
        for block in &path {
            let hash = block.hash();
            self.index.put_number(block.number(), hash);
            self.index.put_full(hash, Arc::new(block.clone()));
        }
        // the new peak itself is always rewritten even if already visited
        self.index.put_number(new_peak.number(), new_peak.hash());
        self.index
            .put_full(new_peak.hash(), Arc::new(new_peak.clone()));
        Ok(())
    }

    /// Side effects common to main-extension and reorg: cache, prune,
    /// notify, relay, and publish the new peak.
    fn on_new_peak(&mut self, block: Block, relay: bool) {
        self.state.set_peak(Arc::new(block.clone()));
        self.shared_cache.put(block.hash(), Arc::new(block.clone()));
        crate::metrics::set_peak(block.number(), block.total_difficulty());

        let tx_hashes: Vec<Hash> = block.transactions.iter().map(|tx| tx.tx_hash).collect();
        self.mempool.prune(&tx_hashes);

        if self.last_ticket_notify != Some(block.hash()) {
            self.ticket.notify(block.hash());
            self.last_ticket_notify = Some(block.hash());
        }

        if relay {
            if block.miner() == self.this_node_miner {
                self.relay_sink.broadcast(&block.export);
            } else {
                self.relay_sink.relay(&block.export);
            }
        }

        self.miner_sink.peak_changed(&block);

        let events = self.events.clone();
        let event = BlockchainEvent::ChainPeakChanged {
            block_height: block.number(),
            block_hash: block.hash(),
            total_difficulty: block.total_difficulty(),
        };
        tokio::spawn(async move {
            events.publish(event).await;
        });

        info!(height = block.number(), hash = ?block.hash(), "peak changed");
    }

    fn final_block(&self) -> Block {
        let peak = self.state.peak();
        let final_number = peak
            .number()
            .saturating_sub(self.config.window_size.min(peak.number()));
        self.store
            .block(final_number)
            .ok()
            .flatten()
            .unwrap_or_else(|| (*peak).clone())
    }

    fn apply_state(&mut self, state: ChainState) -> ChainResult<()> {
        self.store
            .truncate_blocks()
            .map_err(|e| ChainError::StoreFailure {
                source: e.to_string(),
            })?;
        self.index.clear_all();
        let peak = state.peak();
        self.store
            .put_peak(&peak)
            .map_err(|e| ChainError::StoreFailure {
                source: e.to_string(),
            })?;
        self.index.put_full(peak.hash(), peak.clone());
        self.index.put_number(peak.number(), peak.hash());
        self.state = state;
        Ok(())
    }
}

async fn run(mut actor: ChainActor, mut rx: mpsc::Receiver<ChainCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            ChainCommand::AddBlock {
                block,
                relay,
                reply,
            } => {
                let result = actor.handle_add_block(block, relay);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                } else if let Err(err) = result {
                    warn!(error = %err, "async add_block discarded an error");
                }
            }
            ChainCommand::SetPeak { block, reply } => {
                let result = (|| -> ChainResult<()> {
                    actor
                        .store
                        .put_peak(&block)
                        .map_err(|e| ChainError::StoreFailure {
                            source: e.to_string(),
                        })?;
                    actor.refetch_index(&block)?;
                    actor.state.set_peak(Arc::new(block.clone()));
                    Ok(())
                })();
                debug!("set_peak processed");
                let _ = reply.send(result);
            }
            ChainCommand::PeakBlock { reply } => {
                let _ = reply.send(Ok((*actor.state.peak()).clone()));
            }
            ChainCommand::FinalBlock { reply } => {
                let _ = reply.send(Ok(actor.final_block()));
            }
            ChainCommand::PeakState { reply } => {
                let _ = reply.send(Ok(actor.state.clone()));
            }
            ChainCommand::Sync { reply } => {
                let _ = reply.send(Ok(()));
            }
            ChainCommand::SetState { state, reply } => {
                let _ = reply.send(actor.apply_state(state));
            }
            ChainCommand::ResetState { genesis, reply } => {
                let _ = reply.send(actor.apply_state(ChainState::new(genesis)));
            }
        }
    }
}

/// Clonable façade implementing `ChainManagerApi`. Read operations that
/// do not require actor-owned state bypass the mailbox entirely.
#[derive(Clone)]
pub struct ChainActorHandle {
    tx: mpsc::Sender<ChainCommand>,
    index: Arc<BlockIndex>,
    shared_cache: Arc<SharedBlockCache>,
    store: Arc<dyn ChainStore>,
}

impl ChainActorHandle {
    async fn call<T>(
        &self,
        bounded: bool,
        build: impl FnOnce(Reply<T>) -> ChainCommand,
    ) -> ChainResult<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .await
            .map_err(|_| ChainError::MailboxClosed)?;
        if bounded {
            tokio::time::timeout(crate::domain::value_objects::ACTOR_CALL_TIMEOUT, rx)
                .await
                .map_err(|_| {
                    crate::metrics::record_actor_timeout();
                    ChainError::ActorTimeout
                })?
                .map_err(|_| ChainError::MailboxClosed)?
        } else {
            rx.await.map_err(|_| ChainError::MailboxClosed)?
        }
    }
}

#[async_trait::async_trait]
impl ChainManagerApi for ChainActorHandle {
    async fn add_block(
        &self,
        block: Block,
        relay: bool,
        async_submit: bool,
    ) -> ChainResult<AddBlockOutcome> {
        if !block.has_state() {
            return Err(ChainError::MissingState(block.hash()));
        }
        if block.number() < 1 {
            return Err(ChainError::InvalidGenesis {
                number: block.number(),
            });
        }

        if async_submit {
            self.tx
                .send(ChainCommand::AddBlock {
                    block,
                    relay,
                    reply: None,
                })
                .await
                .map_err(|_| ChainError::MailboxClosed)?;
            return Ok(AddBlockOutcome::Unknown);
        }

        self.call(true, |reply| ChainCommand::AddBlock {
            block,
            relay,
            reply: Some(reply),
        })
        .await
    }

    async fn set_peak(&self, block: Block) -> ChainResult<()> {
        self.call(false, |reply| ChainCommand::SetPeak { block, reply })
            .await
    }

    async fn peak_block(&self) -> ChainResult<Block> {
        self.call(true, |reply| ChainCommand::PeakBlock { reply })
            .await
    }

    async fn final_block(&self) -> ChainResult<Block> {
        self.call(true, |reply| ChainCommand::FinalBlock { reply })
            .await
    }

    async fn peak_state(&self) -> ChainResult<ChainState> {
        self.call(true, |reply| ChainCommand::PeakState { reply })
            .await
    }

    async fn sync(&self) -> ChainResult<()> {
        self.call(true, |reply| ChainCommand::Sync { reply }).await
    }

    async fn set_state(&self, state: ChainState) -> ChainResult<()> {
        self.call(false, |reply| ChainCommand::SetState { state, reply })
            .await
    }

    async fn reset_state(&self, genesis: Block) -> ChainResult<()> {
        self.call(false, |reply| ChainCommand::ResetState { genesis, reply })
            .await
    }

    async fn block_by_hash(&self, hash: Hash) -> ChainResult<Option<Block>> {
        if let Some(Entry::FullBlock(block)) = self.index.get_by_hash(&hash) {
            return Ok(Some((*block).clone()));
        }
        if let Some(block) = self.shared_cache.get(&hash) {
            return Ok(Some((*block).clone()));
        }
        let store = self.store.clone();
        let fetched = store
            .block_by_hash(&hash)
            .map_err(|e| ChainError::StoreFailure {
                source: e.to_string(),
            })?;
        if let Some(ref block) = fetched {
            self.shared_cache.put(hash, Arc::new(block.clone()));
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{
        InMemoryChainStore, NullMempoolSink, NullMinerSink, NullRelaySink, NullTicketSink,
    };
    use shared_bus::InMemoryEventBus;

    fn test_handle() -> ChainActorHandle {
        let genesis = Block::genesis([1u8; 32], 1);
        let index = Arc::new(BlockIndex::new());
        let shared_cache = Arc::new(SharedBlockCache::new(16));
        let store: Arc<dyn ChainStore> = Arc::new(InMemoryChainStore::new());
        store.put_peak(&genesis).unwrap();
        let events: Arc<dyn EventPublisher> = Arc::new(InMemoryEventBus::new());
        let actor = ChainActor::new(
            genesis,
            index,
            shared_cache,
            store,
            events,
            Arc::new(NullMempoolSink),
            Arc::new(NullRelaySink),
            Arc::new(NullTicketSink),
            Arc::new(NullMinerSink),
            [1u8; 32],
            ChainManagerConfig::for_testing(),
        );
        actor.spawn()
    }

    fn child(number: u64, parent: Hash, td: u128, miner: PublicKey) -> Block {
        let mut b = Block::genesis(miner, 1_700_000_000 + number);
        b.number = number;
        b.parent_hash = parent;
        b.total_difficulty = td;
        b
    }

    #[tokio::test]
    async fn linear_extension_updates_peak() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2, [1u8; 32]);

        let outcome = handle.add_block(b1.clone(), true, false).await.unwrap();
        assert_eq!(outcome, AddBlockOutcome::Added);

        let peak = handle.peak_block().await.unwrap();
        assert_eq!(peak.hash(), b1.hash());
    }

    #[tokio::test]
    async fn duplicate_add_is_idempotent() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2, [1u8; 32]);

        handle.add_block(b1.clone(), true, false).await.unwrap();
        let second = handle.add_block(b1.clone(), true, false).await.unwrap();

        assert_eq!(second, AddBlockOutcome::Added);
        assert_eq!(handle.peak_block().await.unwrap().hash(), b1.hash());
    }

    #[tokio::test]
    async fn alt_branch_inferior_td_does_not_move_peak() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2, [1u8; 32]);
        handle.add_block(b1.clone(), true, false).await.unwrap();

        let mut b1_alt = child(1, genesis.hash(), 2, [2u8; 32]);
        b1_alt.timestamp += 999; // ensure distinct hash
        let outcome = handle.add_block(b1_alt.clone(), true, false).await.unwrap();

        assert_eq!(outcome, AddBlockOutcome::Stored);
        assert_eq!(handle.peak_block().await.unwrap().hash(), b1.hash());
        let stored = handle.block_by_hash(b1_alt.hash()).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn reorg_when_challenger_branch_overtakes() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2, [1u8; 32]);
        handle.add_block(b1.clone(), true, false).await.unwrap();

        let mut b1_alt = child(1, genesis.hash(), 2, [2u8; 32]);
        b1_alt.timestamp += 999;
        handle.add_block(b1_alt.clone(), true, false).await.unwrap();

        let b2_alt = child(2, b1_alt.hash(), 3, [2u8; 32]);
        let outcome = handle.add_block(b2_alt.clone(), true, false).await.unwrap();

        assert_eq!(outcome, AddBlockOutcome::Added);
        let peak = handle.peak_block().await.unwrap();
        assert_eq!(peak.hash(), b2_alt.hash());

        // original B1 is still retrievable from the store.
        let original_b1 = handle.block_by_hash(b1.hash()).await.unwrap();
        assert!(original_b1.is_some());
    }

    #[tokio::test]
    async fn rejects_block_without_state() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let mut b1 = child(1, genesis.hash(), 2, [1u8; 32]);
        b1.has_state = false;

        let result = handle.add_block(b1, true, false).await;
        assert!(matches!(result, Err(ChainError::MissingState(_))));
    }

    #[tokio::test]
    async fn window_eviction_demotes_old_full_blocks() {
        let handle = test_handle(); // window_size = 4 in for_testing()
        let mut parent = handle.peak_block().await.unwrap();
        let mut first_hash = None;
        for number in 1..=6u64 {
            let b = child(number, parent.hash(), number as u128 + 1, [1u8; 32]);
            if number == 1 {
                first_hash = Some(b.hash());
            }
            handle.add_block(b.clone(), true, false).await.unwrap();
            parent = b;
        }

        let first = first_hash.unwrap();
        assert!(handle.block_by_hash(first).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn async_add_block_returns_unknown() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2, [1u8; 32]);

        let outcome = handle.add_block(b1, true, true).await.unwrap();
        assert_eq!(outcome, AddBlockOutcome::Unknown);
    }

    #[tokio::test]
    async fn sync_drains_prior_messages() {
        let handle = test_handle();
        let genesis = handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2, [1u8; 32]);

        handle.add_block(b1.clone(), true, true).await.unwrap();
        handle.sync().await.unwrap();

        assert_eq!(handle.peak_block().await.unwrap().hash(), b1.hash());
    }
}
