//! Tunable constants and configuration.
//!
//! Mirrors `qc-02-block-storage::domain::value_objects::StorageConfig`:
//! a plain config struct with a `Default` impl and a `for_testing`
//! constructor, rather than environment-sourced globals.

use std::time::Duration;

/// Number of recent main-chain blocks kept as `FullBlock` entries in the
/// Block Index.
pub const WINDOW_SIZE: u64 = 1000;

/// Per-task MRU capacity.
pub const TASK_CACHE_SIZE: usize = 10;

/// Process-wide shared LRU capacity.
pub const SHARED_CACHE_SIZE: usize = 1000;

/// Per-block gas cap surfaced to the external block validator.
pub const GAS_LIMIT: u64 = 20_000_000;

/// Minimum gas price surfaced to the external block validator.
pub const GAS_PRICE: u64 = 0;

/// Estimation constant used by callers sizing block-building budgets.
pub const AVG_TX_GAS: u64 = 200_000;

/// Target inter-block spacing.
pub const BLOCKTIME: Duration = Duration::from_secs(15);

/// Blocks per epoch in production.
pub const EPOCH_LENGTH_PRODUCTION: u64 = 40_320;

/// Blocks per epoch in development/testing.
pub const EPOCH_LENGTH_DEVELOPMENT: u64 = 4;

/// Background-sync throttle sleep.
pub const IMPORT_SYNC_THROTTLE: Duration = Duration::from_secs(30);

/// Synchronous actor call budget. `set_peak`/`set_state`/
/// `reset_state` are exempt and wait unboundedly.
pub const ACTOR_CALL_TIMEOUT: Duration = Duration::from_secs(25);

/// Export/import chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Runtime configuration for the Chain Manager.
#[derive(Debug, Clone)]
pub struct ChainManagerConfig {
    pub window_size: u64,
    pub task_cache_size: usize,
    pub shared_cache_size: usize,
    pub epoch_length: u64,
    pub actor_call_timeout: Duration,
    pub import_sync_throttle: Duration,
    pub chunk_size: usize,
}

impl ChainManagerConfig {
    /// Production defaults: full window, 40,320-block epochs.
    #[must_use]
    pub fn production() -> Self {
        Self {
            window_size: WINDOW_SIZE,
            task_cache_size: TASK_CACHE_SIZE,
            shared_cache_size: SHARED_CACHE_SIZE,
            epoch_length: EPOCH_LENGTH_PRODUCTION,
            actor_call_timeout: ACTOR_CALL_TIMEOUT,
            import_sync_throttle: IMPORT_SYNC_THROTTLE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Development defaults: short 4-block epochs, same window/cache sizes.
    #[must_use]
    pub fn development() -> Self {
        Self {
            epoch_length: EPOCH_LENGTH_DEVELOPMENT,
            ..Self::production()
        }
    }

    /// Small window/caches and no throttle sleep, for fast unit tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            window_size: 4,
            task_cache_size: 4,
            shared_cache_size: 16,
            epoch_length: EPOCH_LENGTH_DEVELOPMENT,
            actor_call_timeout: Duration::from_secs(25),
            import_sync_throttle: Duration::from_millis(1),
            chunk_size: 4,
        }
    }
}

impl Default for ChainManagerConfig {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_uses_full_window() {
        let config = ChainManagerConfig::production();
        assert_eq!(config.window_size, WINDOW_SIZE);
        assert_eq!(config.epoch_length, EPOCH_LENGTH_PRODUCTION);
    }

    #[test]
    fn development_shortens_epoch_only() {
        let config = ChainManagerConfig::development();
        assert_eq!(config.epoch_length, EPOCH_LENGTH_DEVELOPMENT);
        assert_eq!(config.window_size, WINDOW_SIZE);
    }

    #[test]
    fn testing_config_has_no_meaningful_throttle() {
        let config = ChainManagerConfig::for_testing();
        assert!(config.import_sync_throttle < Duration::from_secs(1));
    }
}
