//! # Shard Assignment Algorithm
//!
//! Deterministic shard assignment using consistent hashing.
//!
//! Reference: System.md Lines 676-680, SPEC-14 Lines 120-142

use crate::domain::{Address, Hash, ShardId};
use sha3::{Digest, Keccak256};

/// Simple modulo-based shard assignment.
///
/// Reference: System.md Line 680 - "Hash(account) % num_shards"
///
/// Fast but causes many reassignments when shard count changes.
pub fn assign_shard(address: &Address, shard_count: u16) -> ShardId {
    if shard_count == 0 {
        return 0;
    }

    let hash = keccak256(address);
    let value = u16::from_be_bytes([hash[0], hash[1]]);
    value % shard_count
}

/// Rendezvous hashing for minimal reassignment.
///
/// Reference: SPEC-14 Lines 131-141
///
/// When adding shard N, only 1/N addresses move to the new shard.
/// Also known as "highest random weight" hashing.
///
/// # Optimization
///
/// Pre-allocates a single buffer for all hash computations to avoid
/// repeated allocations in the hot path.
pub fn rendezvous_assign(address: &Address, shards: &[ShardId]) -> ShardId {
    if shards.is_empty() {
        return 0;
    }

    if shards.len() == 1 {
        return shards[0];
    }

    // OPTIMIZATION: Pre-allocate buffer outside loop
    let mut input = [0u8; 22]; // 20 bytes address + 2 bytes shard ID
    input[..20].copy_from_slice(address);

    let mut best_shard = shards[0];
    let mut best_hash = [0u8; 32];

    for shard in shards {
        // Copy shard ID into buffer
        input[20..22].copy_from_slice(&shard.to_be_bytes());
        let combined = keccak256(&input);

        if combined > best_hash {
            best_hash = combined;
            best_shard = *shard;
        }
    }

    best_shard
}

/// Detect if a transaction is cross-shard.
///
/// Reference: SPEC-14 Line 427
pub fn is_cross_shard(sender: &Address, recipients: &[Address], shard_count: u16) -> bool {
    let sender_shard = assign_shard(sender, shard_count);

    recipients
        .iter()
        .any(|r| assign_shard(r, shard_count) != sender_shard)
}

/// Get all shards involved in a transaction.
pub fn get_involved_shards(
    sender: &Address,
    recipients: &[Address],
    shard_count: u16,
) -> Vec<ShardId> {
    let mut shards = vec![assign_shard(sender, shard_count)];

    for recipient in recipients {
        let shard = assign_shard(recipient, shard_count);
        if !shards.contains(&shard) {
            shards.push(shard);
        }
    }

    shards
}

/// Helper: keccak256 hash.
fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
