//! # Chain Manager Metrics
//!
//! Prometheus metrics for chain progression and fork-choice health.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-chain-manager = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `chain_blocks_added_total` - Counter of blocks accepted onto the main chain
//! - `chain_blocks_stored_alt_total` - Counter of blocks stored as alt branches
//! - `chain_reorgs_total` - Counter of peak reorganizations
//! - `chain_actor_timeouts_total` - Counter of synchronous calls that exceeded budget
//! - `chain_index_evictions_total` - Counter of Block Index window evictions
//! - `chain_peak_height` - Gauge of the current peak block number
//! - `chain_peak_total_difficulty` - Gauge of the current peak's total difficulty

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_gauge, register_int_counter, Gauge, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BLOCKS_ADDED: IntCounter = register_int_counter!(
        "chain_blocks_added_total",
        "Total number of blocks accepted onto the main chain"
    )
    .expect("Failed to create BLOCKS_ADDED metric");

    pub static ref BLOCKS_STORED_ALT: IntCounter = register_int_counter!(
        "chain_blocks_stored_alt_total",
        "Total number of blocks stored as alt branches"
    )
    .expect("Failed to create BLOCKS_STORED_ALT metric");

    pub static ref REORGS: IntCounter = register_int_counter!(
        "chain_reorgs_total",
        "Total number of peak reorganizations"
    )
    .expect("Failed to create REORGS metric");

    pub static ref ACTOR_TIMEOUTS: IntCounter = register_int_counter!(
        "chain_actor_timeouts_total",
        "Total number of synchronous actor calls that exceeded the budget"
    )
    .expect("Failed to create ACTOR_TIMEOUTS metric");

    pub static ref INDEX_EVICTIONS: IntCounter = register_int_counter!(
        "chain_index_evictions_total",
        "Total number of Block Index window evictions"
    )
    .expect("Failed to create INDEX_EVICTIONS metric");

    pub static ref PEAK_HEIGHT: Gauge = register_gauge!(
        "chain_peak_height",
        "Current peak block number"
    )
    .expect("Failed to create PEAK_HEIGHT metric");

    pub static ref PEAK_TOTAL_DIFFICULTY: Gauge = register_gauge!(
        "chain_peak_total_difficulty",
        "Current peak total difficulty"
    )
    .expect("Failed to create PEAK_TOTAL_DIFFICULTY metric");
}

#[cfg(feature = "metrics")]
pub fn record_block_added() {
    BLOCKS_ADDED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_block_stored_alt() {
    BLOCKS_STORED_ALT.inc();
}

#[cfg(feature = "metrics")]
pub fn record_reorg() {
    REORGS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_actor_timeout() {
    ACTOR_TIMEOUTS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_index_eviction() {
    INDEX_EVICTIONS.inc();
}

#[cfg(feature = "metrics")]
pub fn set_peak(height: u64, total_difficulty: u128) {
    PEAK_HEIGHT.set(height as f64);
    PEAK_TOTAL_DIFFICULTY.set(total_difficulty as f64);
}

#[cfg(not(feature = "metrics"))]
pub fn record_block_added() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_stored_alt() {}

#[cfg(not(feature = "metrics"))]
pub fn record_reorg() {}

#[cfg(not(feature = "metrics"))]
pub fn record_actor_timeout() {}

#[cfg(not(feature = "metrics"))]
pub fn record_index_eviction() {}

#[cfg(not(feature = "metrics"))]
pub fn set_peak(_height: u64, _total_difficulty: u128) {}
