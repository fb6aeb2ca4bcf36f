//! Block entity owned by the Chain Manager.
//!
//! `shared_types::ValidatedBlock` does not carry the fields fork choice
//! needs (`total_difficulty`, `epoch`, `has_state?`, `miner`), so this
//! crate defines its own `Block` rather than stretch a type that belongs
//! to Consensus (Subsystem 8) and Block Storage (Subsystem 2).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Hash, PublicKey, ValidatedTransaction};

/// A transaction receipt produced by execution, opaque beyond its hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: Hash,
    pub success: bool,
    pub gas_used: u64,
}

/// A block as seen by the Chain Manager.
///
/// `Block.validate` (the external consensus/EVM pipeline) is a black box
/// from this crate's point of view; values of this type are assumed
/// already validated by the time they reach `add_block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub version: u16,
    pub number: u64,
    pub parent_hash: Hash,
    pub merkle_root: Hash,
    pub state_root: Hash,
    pub timestamp: u64,
    pub proposer: PublicKey,
    pub total_difficulty: u128,
    pub epoch: u64,
    pub has_state: bool,
    pub miner: PublicKey,
    pub transactions: Vec<ValidatedTransaction>,
    pub receipts: Vec<Receipt>,
    /// Pre-serialized bytes handed to the codec bridge on export/relay.
    pub export: Vec<u8>,
}

impl Block {
    /// Build the genesis block: number 0, self-parented, `TD = 1`.
    #[must_use]
    pub fn genesis(miner: PublicKey, timestamp: u64) -> Self {
        let mut genesis = Self {
            version: 1,
            number: 0,
            parent_hash: [0u8; 32],
            merkle_root: [0u8; 32],
            state_root: [0u8; 32],
            timestamp,
            proposer: miner,
            total_difficulty: 1,
            epoch: 0,
            has_state: true,
            miner,
            transactions: Vec::new(),
            receipts: Vec::new(),
            export: Vec::new(),
        };
        genesis.export = bincode::serialize(&genesis).unwrap_or_default();
        genesis
    }

    /// Content hash over the identifying header fields.
    ///
    /// Folds in `total_difficulty` and `epoch` (unlike
    /// `qc-02-block-storage`'s block hash) so that two otherwise-identical
    /// alt-branch candidates with different difficulty never collide.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.number.to_le_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.merkle_root);
        hasher.update(self.state_root);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.proposer);
        hasher.update(self.total_difficulty.to_le_bytes());
        hasher.update(self.epoch.to_le_bytes());
        hasher.update(self.miner);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn parent_hash(&self) -> Hash {
        self.parent_hash
    }

    #[must_use]
    pub fn total_difficulty(&self) -> u128 {
        self.total_difficulty
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn has_state(&self) -> bool {
        self.has_state
    }

    #[must_use]
    pub fn miner(&self) -> PublicKey {
        self.miner
    }
}
