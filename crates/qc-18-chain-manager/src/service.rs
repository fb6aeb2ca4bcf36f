//! Composition root: wires the domain, the actor, and the outbound ports
//! into one handle the rest of the node constructs.
//!
//! Reference: mirrors `qc-02-block-storage::service::BlockStorageService::new`
//! (dependency injection of every outbound collaborator through the
//! constructor) simplified to trait objects, since the Chain Actor is
//! already behind `Arc<dyn _>` ports rather than generic type parameters.

use std::sync::Arc;

use shared_bus::EventPublisher;
use shared_types::PublicKey;

use crate::actor::{ChainActor, ChainActorHandle};
use crate::domain::block::Block;
use crate::domain::block_index::BlockIndex;
use crate::domain::hot_cache::SharedBlockCache;
use crate::domain::value_objects::ChainManagerConfig;
use crate::exporter;
use crate::importer::{ImportReport, Importer};
use crate::ports::outbound::{
    BlockValidator, ChainStore, ExportSink, InMemoryChainStore, MempoolSink, MinerSink,
    NullMempoolSink, NullMinerSink, NullRelaySink, NullTicketSink, RelaySink, TicketSink,
};
use crate::sync_coordinator::SyncCoordinator;
use crate::ChainResult;

/// Everything a node needs to talk to the Chain Manager.
pub struct ChainManagerService {
    pub handle: ChainActorHandle,
    pub importer: Importer,
    store: Arc<dyn ChainStore>,
    config: ChainManagerConfig,
}

impl ChainManagerService {
    /// Seed the genesis block (if the store is empty) and wire the actor,
    /// importer and sync coordinator together.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn ChainStore>,
        validator: Arc<dyn BlockValidator>,
        events: Arc<dyn EventPublisher>,
        mempool: Arc<dyn MempoolSink>,
        relay: Arc<dyn RelaySink>,
        ticket: Arc<dyn TicketSink>,
        miner: Arc<dyn MinerSink>,
        this_node_miner: PublicKey,
        genesis_timestamp: u64,
        config: ChainManagerConfig,
    ) -> ChainResult<Self> {
        let genesis = match store.peak_block()? {
            Some(existing) => existing,
            None => {
                let genesis = Block::genesis(this_node_miner, genesis_timestamp);
                store.truncate_blocks()?;
                store.put_peak(&genesis)?;
                genesis
            }
        };

        let index = Arc::new(BlockIndex::new());
        prefetch_index(&index, &store, &config)?;

        let shared_cache = Arc::new(SharedBlockCache::new(config.shared_cache_size));

        let actor = ChainActor::new(
            genesis,
            index,
            shared_cache,
            store.clone(),
            events.clone(),
            mempool,
            relay,
            ticket,
            miner,
            this_node_miner,
            config.clone(),
        );
        let handle = actor.spawn();

        let sync = Arc::new(SyncCoordinator::new(events, config.import_sync_throttle));
        let importer = Importer::new(handle.clone(), validator, sync, config.clone());

        Ok(Self {
            handle,
            importer,
            store,
            config,
        })
    }

    /// An in-memory wiring for tests and local development.
    #[must_use]
    pub fn new_in_memory(this_node_miner: PublicKey) -> Self {
        use crate::ports::outbound::AcceptingValidator;
        use shared_bus::InMemoryEventBus;

        Self::new(
            Arc::new(InMemoryChainStore::new()),
            Arc::new(AcceptingValidator),
            Arc::new(InMemoryEventBus::new()),
            Arc::new(NullMempoolSink),
            Arc::new(NullRelaySink),
            Arc::new(NullTicketSink),
            Arc::new(NullMinerSink),
            this_node_miner,
            0,
            ChainManagerConfig::default(),
        )
        .expect("in-memory wiring never fails")
    }

    pub async fn import_blocks(&self, source: Vec<Block>) -> ChainResult<ImportReport> {
        self.importer.import_blocks(source).await
    }

    pub fn export_blocks(&self, sink: &Arc<dyn ExportSink>) -> ChainResult<u64> {
        exporter::export_blocks(&self.store, sink, self.config.chunk_size)
    }
}

/// Rebuild the Block Index from the store on startup; the store is the
/// authoritative repair path. Every known hash gets at least a
/// `Placeholder`; the top `window_size` main-chain numbers get `FullBlock`.
fn prefetch_index(
    index: &Arc<BlockIndex>,
    store: &Arc<dyn ChainStore>,
    config: &ChainManagerConfig,
) -> ChainResult<()> {
    for (hash, _number) in store.all_block_hashes()? {
        index.put_placeholder(hash);
    }

    for block in store.top_blocks(config.window_size as usize)? {
        let hash = block.hash();
        index.put_full(hash, Arc::new(block.clone()));
        index.put_number(block.number(), hash);
    }

    index.set_placeholder_complete(true);
    Ok(())
}
