//! Error kinds for the Chain Manager.
//!
//! `MailboxClosed` is the one addition specific to the channel-based
//! actor: a dropped receiver has no analogue in a supervised process
//! model, where the process cannot simply vanish out from under a
//! caller without its own exit signal.

use shared_types::Hash;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// Not a failure path in practice; kept for completeness (the fork
    /// choice `Duplicate` outcome handles an already-known block without
    /// ever constructing this variant).
    #[error("block is already known")]
    AlreadyPresent,

    #[error("invalid genesis: block number {number} must be >= 1 past genesis")]
    InvalidGenesis { number: u64 },

    #[error("block {0:?} lacks executed state (has_state = false)")]
    MissingState(Hash),

    #[error("block validation failed: {reason}")]
    ValidationFailure { reason: String },

    #[error("chain store failure: {source}")]
    StoreFailure { source: String },

    #[error("actor call exceeded the 25s synchronous budget")]
    ActorTimeout,

    #[error("chain actor mailbox is closed")]
    MailboxClosed,
}

pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_invariant_context() {
        let err = ChainError::InvalidGenesis { number: 0 };
        assert!(err.to_string().contains("invalid genesis"));
    }

    #[test]
    fn mailbox_closed_is_distinct_from_timeout() {
        assert_ne!(
            ChainError::MailboxClosed.to_string(),
            ChainError::ActorTimeout.to_string()
        );
    }
}
