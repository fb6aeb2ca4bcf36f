//! Exporter / Codec Bridge (C7): bulk dump of the main chain into a
//! secondary store.
//!
//! Blocks are walked descending from the peak as a lazy sequence and
//! written `chunk_size` at a time, each chunk one atomic `write_chunk`
//! call.

use std::sync::Arc;

use tracing::info;

use crate::domain::block::Block;
use crate::domain::errors::{ChainError, ChainResult};
use crate::ports::outbound::{ChainStore, ExportSink};

/// Export the main chain descending from the peak into `sink`, resuming
/// just below whatever `sink` already holds. Returns the number of
/// blocks written.
pub fn export_blocks(
    store: &Arc<dyn ChainStore>,
    sink: &Arc<dyn ExportSink>,
    chunk_size: usize,
) -> ChainResult<u64> {
    let chunk_size = chunk_size.max(1);
    let peak = store
        .peak_block()?
        .ok_or_else(|| ChainError::StoreFailure {
            source: "cannot export an empty chain".to_string(),
        })?;

    let start = match sink.highest_recorded_number()? {
        Some(highest) if highest == 0 => return Ok(0),
        Some(highest) if highest <= peak.number() => highest - 1,
        Some(_) => return Ok(0), // secondary store is already ahead; nothing to do
        None => peak.number(),
    };

    let mut cursor = Some(start);
    let mut buffer: Vec<(u64, Vec<u8>)> = Vec::with_capacity(chunk_size);
    let mut written = 0u64;

    while let Some(number) = cursor {
        let Some(block) = store.block(number)? else {
            break;
        };
        let payload = serialize_record(&block)?;
        buffer.push((number, payload));
        written += 1;

        cursor = number.checked_sub(1);

        if buffer.len() >= chunk_size || cursor.is_none() {
            sink.write_chunk(&buffer)?;
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        sink.write_chunk(&buffer)?;
    }

    info!(written, "export run complete");
    Ok(written)
}

/// Encode one export record: `{uint32 size, bytes payload}`.
fn serialize_record(block: &Block) -> ChainResult<Vec<u8>> {
    let payload = bincode::serialize(block).map_err(|e| ChainError::StoreFailure {
        source: e.to_string(),
    })?;
    let mut record = Vec::with_capacity(4 + payload.len());
    record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{InMemoryChainStore, InMemoryExportSink};

    fn child(number: u64, parent: shared_types::Hash, td: u128) -> Block {
        let mut b = Block::genesis([2u8; 32], 1_700_000_000 + number);
        b.number = number;
        b.parent_hash = parent;
        b.total_difficulty = td;
        b
    }

    #[test]
    fn exports_every_main_chain_block_on_first_run() {
        let store: Arc<dyn ChainStore> = Arc::new(InMemoryChainStore::new());
        let genesis = Block::genesis([2u8; 32], 1);
        let b1 = child(1, genesis.hash(), 2);
        let b2 = child(2, b1.hash(), 3);
        store.put_block(&genesis).unwrap();
        store.put_block(&b1).unwrap();
        store.put_peak(&b2).unwrap();

        let sink: Arc<dyn ExportSink> = Arc::new(InMemoryExportSink::new());
        let written = export_blocks(&store, &sink, 2).unwrap();

        assert_eq!(written, 3);
    }

    #[test]
    fn resumes_below_the_highest_recorded_number() {
        let store: Arc<dyn ChainStore> = Arc::new(InMemoryChainStore::new());
        let genesis = Block::genesis([2u8; 32], 1);
        let b1 = child(1, genesis.hash(), 2);
        let b2 = child(2, b1.hash(), 3);
        store.put_block(&genesis).unwrap();
        store.put_block(&b1).unwrap();
        store.put_peak(&b2).unwrap();

        let sink = InMemoryExportSink::new();
        sink.write_chunk(&[(2, vec![0u8; 4])]).unwrap();
        let sink: Arc<dyn ExportSink> = Arc::new(sink);

        let written = export_blocks(&store, &sink, 10).unwrap();
        assert_eq!(written, 2); // blocks 1 and 0 remain below the recorded row
    }

    #[test]
    fn empty_store_returns_error() {
        let store: Arc<dyn ChainStore> = Arc::new(InMemoryChainStore::new());
        let sink: Arc<dyn ExportSink> = Arc::new(InMemoryExportSink::new());
        assert!(export_blocks(&store, &sink, 10).is_err());
    }
}
