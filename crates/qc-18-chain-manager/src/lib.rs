//! # Chain Manager
//!
//! Owns the canonical view of the chain: the current peak, the recent
//! full-block window, and the fork-choice arbitration between competing
//! branches. Everything else (consensus, mempool, networking) treats this
//! crate as the single source of truth for "what is the chain right now."
//!
//! ## Shape
//!
//! - [`domain`] - `Block`, `ChainState`, the `BlockIndex`, caches, fork choice
//! - [`ports`] - inbound API (`ChainManagerApi`) and outbound collaborators
//!   (store, validator, mempool, relay, ticket, miner, event bus, export sink)
//! - [`actor`] - the single-writer mailbox that serializes all chain mutation
//! - [`importer`] - streaming replay of an externally supplied block range
//! - [`exporter`] - bulk dump of the main chain into a secondary store
//! - [`sync_coordinator`] - elects the one foreground synchronizer
//! - [`service`] - composition root wiring the above into one handle
//! - [`metrics`] - optional Prometheus counters/gauges, gated by the
//!   `metrics` feature
//!
//! ## Concurrency
//!
//! All mutation funnels through a single actor task reading from a bounded
//! mailbox, so fork choice and index updates never race each other. Reads
//! (`block_by_hash`) bypass the mailbox entirely and consult the shared
//! index, the LRU cache, and then the store directly.

pub mod actor;
pub mod domain;
pub mod exporter;
pub mod importer;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod sync_coordinator;

pub use domain::block::Block;
pub use domain::chain_state::ChainState;
pub use domain::errors::{ChainError, ChainResult};
pub use domain::value_objects::ChainManagerConfig;
pub use ports::inbound::{AddBlockOutcome, ChainManagerApi};
pub use ports::outbound::{BlockValidator, ChainStore, ExportSink};
pub use service::ChainManagerService;
