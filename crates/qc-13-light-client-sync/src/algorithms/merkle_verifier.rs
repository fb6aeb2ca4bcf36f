//! # Merkle Proof Verification
//!
//! SPV Merkle proof verification algorithm.
//!
//! Reference: System.md Line 628, SPEC-13 Lines 130-138

use sha2::{Digest, Sha256};
use crate::domain::{Hash, LightClientError, ProofNode, Position};

/// Verify a Merkle proof for transaction inclusion.
///
/// Reference: System.md Line 628 - "Verify via Merkle proofs"
///
/// # Algorithm
///
/// 1. Start with the transaction hash as current hash
/// 2. For each node in the proof path:
///    - If sibling is on left: hash = SHA256(sibling || current)
///    - If sibling is on right: hash = SHA256(current || sibling)
/// 3. Final hash should equal merkle_root
///
/// # Time Complexity: O(log n)
/// # Space Complexity: O(1)
pub fn verify_merkle_proof(
    tx_hash: &Hash,
    proof_path: &[ProofNode],
    expected_root: &Hash,
) -> bool {
    // Edge case: empty proof is valid only if tx_hash == root
    if proof_path.is_empty() {
        return tx_hash == expected_root;
    }

    let mut current = *tx_hash;

    for node in proof_path {
        current = match node.position {
            Position::Left => hash_concat(&node.hash, &current),
            Position::Right => hash_concat(&current, &node.hash),
        };
    }

    current == *expected_root
}

/// Hash two nodes together.
fn hash_concat(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Build a Merkle tree from transaction hashes.
///
/// Returns the Merkle root hash.
pub fn compute_merkle_root(tx_hashes: &[Hash]) -> Hash {
    if tx_hashes.is_empty() {
        return [0u8; 32];
    }

    if tx_hashes.len() == 1 {
        return tx_hashes[0];
    }

    let mut level: Vec<Hash> = tx_hashes.to_vec();

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);

        for chunk in level.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left); // Duplicate last if odd
            next_level.push(hash_concat(left, right));
        }

        level = next_level;
    }

    level[0]
}

/// Build a Merkle proof for a specific transaction.
pub fn build_merkle_proof(tx_hashes: &[Hash], tx_index: usize) -> Result<Vec<ProofNode>, LightClientError> {
    if tx_index >= tx_hashes.len() {
        return Err(LightClientError::TransactionNotFound([0u8; 32]));
    }

    if tx_hashes.len() == 1 {
        return Ok(vec![]);
    }

    let mut proof = Vec::new();
    let mut level: Vec<Hash> = tx_hashes.to_vec();
    let mut index = tx_index;

    while level.len() > 1 {
        let sibling_index = if index % 2 == 0 { index + 1 } else { index - 1 };

        if sibling_index < level.len() {
            let position = if index % 2 == 0 {
                Position::Right // Sibling is on the right
            } else {
                Position::Left // Sibling is on the left
            };
            proof.push(ProofNode {
                hash: level[sibling_index],
                position,
            });
        } else if index + 1 == level.len() {
            // Last element with no pair - duplicate self
            proof.push(ProofNode {
                hash: level[index],
                position: Position::Right,
            });
        }

        // Move to next level
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left);
            next_level.push(hash_concat(left, right));
        }
        level = next_level;
        index /= 2;
    }

    Ok(proof)
}
