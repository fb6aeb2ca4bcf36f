//! Domain layer: entities, indices, caches and fork-choice logic.
//!
//! No module here touches I/O or `tokio`; the actor (`crate::actor`)
//! is the only place domain state is mutated concurrently.

pub mod block;
pub mod block_index;
pub mod chain_state;
pub mod errors;
pub mod fork_choice;
pub mod hot_cache;
pub mod value_objects;

pub use block::{Block, Receipt};
pub use block_index::{BlockIndex, Entry, IndexKey};
pub use chain_state::ChainState;
pub use errors::{ChainError, ChainResult};
pub use fork_choice::ForkChoiceOutcome;
pub use hot_cache::{SharedBlockCache, TaskCache};
pub use value_objects::ChainManagerConfig;
