//! Hash functions for Bloom filter
//!
//! Reference: System.md, Subsystem 7 - Multiple hash functions (k=3-7)
//!
//! Uses MurmurHash3 for fast, high-quality hashing with different seeds.

use std::io::Cursor;

/// Hash an element with MurmurHash3 using a seed and tweak
///
/// The combination of seed (for different hash functions) and tweak
/// (for filter rotation) ensures independent hash outputs.
pub fn murmur_hash(element: &[u8], seed: u32, tweak: u32) -> u64 {
    let combined_seed = seed.wrapping_add(tweak);
    let mut cursor = Cursor::new(element);

    // Use murmur3 128-bit hash and take the lower 64 bits
    let hash = murmur3::murmur3_x64_128(&mut cursor, combined_seed).unwrap_or(0);
    hash as u64
}

/// Compute k hash positions for an element
///
/// Uses double hashing technique: h(i) = h1 + i * h2
/// This is more efficient than computing k independent hashes.
pub fn compute_hash_positions(element: &[u8], k: usize, m: usize, tweak: u32) -> Vec<usize> {
    let h1 = murmur_hash(element, 0, tweak);
    let h2 = murmur_hash(element, 1, tweak);

    (0..k)
        .map(|i| {
            let hash = h1.wrapping_add((i as u64).wrapping_mul(h2));
            (hash % m as u64) as usize
        })
        .collect()
}

/// Verify that hash function is deterministic
pub fn hash_is_deterministic(element: &[u8], seed: u32, tweak: u32) -> bool {
    let h1 = murmur_hash(element, seed, tweak);
    let h2 = murmur_hash(element, seed, tweak);
    h1 == h2
}
