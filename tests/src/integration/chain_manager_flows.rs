//! # Chain Manager Integration Flows
//!
//! Exercises qc-18-chain-manager's public API end to end, against a real
//! event bus and a fresh in-memory store per test, rather than the
//! crate-local unit tests that drive the actor directly.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use shared_bus::events::{BlockchainEvent, EventFilter};
    use shared_bus::publisher::InMemoryEventBus;
    use shared_types::Hash;

    use qc_18_chain_manager::domain::block::Block;
    use qc_18_chain_manager::domain::value_objects::ChainManagerConfig;
    use qc_18_chain_manager::ports::inbound::{AddBlockOutcome, ChainManagerApi};
    use qc_18_chain_manager::ports::outbound::{
        AcceptingValidator, ChainStore, ExportSink, InMemoryChainStore, InMemoryExportSink,
        NullMempoolSink, NullMinerSink, NullRelaySink, NullTicketSink,
    };
    use qc_18_chain_manager::ChainManagerService;

    const MINER: [u8; 32] = [7u8; 32];

    fn child(number: u64, parent: Hash, td: u128) -> Block {
        let mut b = Block::genesis(MINER, 1_700_000_000 + number);
        b.number = number;
        b.parent_hash = parent;
        b.total_difficulty = td;
        b
    }

    fn wired_service(
        store: Arc<dyn ChainStore>,
        events: Arc<InMemoryEventBus>,
    ) -> ChainManagerService {
        ChainManagerService::new(
            store,
            Arc::new(AcceptingValidator),
            events,
            Arc::new(NullMempoolSink),
            Arc::new(NullRelaySink),
            Arc::new(NullTicketSink),
            Arc::new(NullMinerSink),
            MINER,
            1,
            ChainManagerConfig::for_testing(),
        )
        .expect("wiring a fresh in-memory store never fails")
    }

    // =============================================================================
    // SCENARIO: linear extension then reorg, observed on the real event bus
    // =============================================================================

    #[tokio::test]
    async fn linear_extension_then_reorg_publishes_peak_changes_on_the_bus() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut peak_changes = bus.subscribe(EventFilter::all());
        let service = wired_service(Arc::new(InMemoryChainStore::new()), bus);

        let genesis = service.handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2);
        let outcome = service.handle.add_block(b1.clone(), false, false).await.unwrap();
        assert_eq!(outcome, AddBlockOutcome::Added);

        let mut b1_alt = child(1, genesis.hash(), 2);
        b1_alt.miner = [8u8; 32];
        let outcome = service
            .handle
            .add_block(b1_alt.clone(), false, false)
            .await
            .unwrap();
        assert_eq!(outcome, AddBlockOutcome::Stored);

        let b2_alt = child(2, b1_alt.hash(), 3);
        let outcome = service
            .handle
            .add_block(b2_alt.clone(), false, false)
            .await
            .unwrap();
        assert_eq!(outcome, AddBlockOutcome::Added);

        let peak = service.handle.peak_block().await.unwrap();
        assert_eq!(peak.hash(), b2_alt.hash());

        let mut saw_reorg_peak = false;
        while let Ok(Some(event)) = timeout(Duration::from_millis(200), peak_changes.recv()).await
        {
            if let BlockchainEvent::ChainPeakChanged { block_hash, .. } = event {
                if block_hash == b2_alt.hash() {
                    saw_reorg_peak = true;
                    break;
                }
            }
        }
        assert!(saw_reorg_peak, "expected the reorg peak to be published");

        // the original B1 remains retrievable from the store under the old hash.
        assert_eq!(
            service
                .handle
                .block_by_hash(b1.hash())
                .await
                .unwrap()
                .unwrap()
                .hash(),
            b1.hash()
        );
    }

    // =============================================================================
    // ROUND-TRIP LAW: export_blocks(sink); import_blocks(sink) into a fresh
    // store produces the same peak hash as the original.
    // =============================================================================

    fn decode_records(sink: &InMemoryExportSink, count: u64) -> Vec<Block> {
        let mut blocks = Vec::new();
        for number in 0..count {
            let record = sink
                .row(number)
                .unwrap_or_else(|| panic!("missing exported row {number}"));
            let len = u32::from_le_bytes(record[..4].try_into().unwrap()) as usize;
            let block: Block = bincode::deserialize(&record[4..4 + len]).unwrap();
            blocks.push(block);
        }
        blocks
    }

    #[tokio::test]
    async fn export_then_import_round_trips_to_the_same_peak() {
        let source_bus = Arc::new(InMemoryEventBus::new());
        let source = wired_service(Arc::new(InMemoryChainStore::new()), source_bus);

        let genesis = source.handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2);
        source.handle.add_block(b1.clone(), false, false).await.unwrap();
        let b2 = child(2, b1.hash(), 3);
        source.handle.add_block(b2.clone(), false, false).await.unwrap();

        let sink_concrete = Arc::new(InMemoryExportSink::new());
        let sink: Arc<dyn ExportSink> = sink_concrete.clone();
        let written = source.export_blocks(&sink).unwrap();
        assert_eq!(written, 3);

        let replay = decode_records(&sink_concrete, written);

        let dest_bus = Arc::new(InMemoryEventBus::new());
        let dest = wired_service(Arc::new(InMemoryChainStore::new()), dest_bus);
        let report = dest.import_blocks(replay).await.unwrap();
        assert_eq!(report.installed, 2);

        let source_peak = source.handle.peak_block().await.unwrap();
        let dest_peak = dest.handle.peak_block().await.unwrap();
        assert_eq!(source_peak.hash(), dest_peak.hash());
    }

    // =============================================================================
    // ROUND-TRIP LAW: set_state(s); state() = s
    // =============================================================================

    #[tokio::test]
    async fn set_state_round_trips_through_peak_state() {
        let bus = Arc::new(InMemoryEventBus::new());
        let service = wired_service(Arc::new(InMemoryChainStore::new()), bus);

        let genesis = service.handle.peak_block().await.unwrap();
        let b1 = child(1, genesis.hash(), 2);
        service.handle.add_block(b1.clone(), false, false).await.unwrap();

        let mut replacement_peak = (*service.handle.peak_state().await.unwrap().peak()).clone();
        replacement_peak.number = 9;
        replacement_peak.parent_hash = genesis.hash();
        replacement_peak.total_difficulty = 99;
        let replacement = qc_18_chain_manager::domain::chain_state::ChainState::new(
            replacement_peak.clone(),
        );

        service.handle.set_state(replacement).await.unwrap();

        let observed = service.handle.peak_state().await.unwrap();
        assert_eq!(observed.peak().hash(), replacement_peak.hash());
        assert_eq!(
            service.handle.peak_block().await.unwrap().hash(),
            replacement_peak.hash()
        );
    }
}
