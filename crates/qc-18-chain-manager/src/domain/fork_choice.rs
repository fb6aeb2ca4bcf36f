//! Fork Choice & Reorg (C5): pure decision logic over a candidate block
//! and the current peak.
//!
//! Unlike `qc-08-consensus::domain::fork_choice::LMDGhostStore`
//! (stake-weighted GHOST over attestations), this module compares total
//! difficulty only: the chain manager receives already-consensus-validated
//! blocks and arbitrates solely on TD. The surrounding shape (a pure
//! decision function, unit-tested per case) follows `LMDGhostStore`'s
//! lead.

use shared_types::Hash;

use super::block::Block;

/// Outcome of evaluating a candidate block against the current peak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkChoiceOutcome {
    /// Block Index already holds a `FullBlock` for this hash.
    Duplicate,
    /// `parent_hash != peak_hash` and `TD(candidate) <= TD(peak)` (case 2).
    AltExtension,
    /// `parent_hash == peak_hash` (case 3).
    MainExtension,
    /// `parent_hash != peak_hash` and `TD(candidate) > TD(peak)` (case 4).
    Reorg,
}

/// Evaluate `candidate` against the current peak.
///
/// `already_full` reports whether the Block Index already holds a
/// `FullBlock` entry for `candidate.hash()` — that lookup belongs to the
/// actor (it owns the index), so this function stays pure and is cheap
/// to exercise without any index or store fixture.
///
/// Tie-breaking: equal `TD` never displaces the incumbent peak (SPEC
/// §4.4 "Tie-breaking on equal TD", confirmed as intended in `DESIGN.md`
/// Open Question 1).
#[must_use]
pub fn decide(candidate: &Block, peak: &Block, already_full: bool) -> ForkChoiceOutcome {
    if already_full {
        return ForkChoiceOutcome::Duplicate;
    }

    let peak_hash = peak.hash();
    if candidate.parent_hash() == peak_hash {
        return ForkChoiceOutcome::MainExtension;
    }

    if candidate.total_difficulty() > peak.total_difficulty() {
        ForkChoiceOutcome::Reorg
    } else {
        ForkChoiceOutcome::AltExtension
    }
}

/// Walk back from `from` along parent pointers, calling `lookup` at each
/// step, until `lookup` reports the number is already mapped to that
/// hash on the main chain.
///
/// `lookup(number) -> Option<Hash>` models a read against the Block
/// Index's number table; the walk stops the first time it already agrees
/// with the chain being installed, which bounds the rewrite to the span
/// between the reorg point and the common ancestor.
pub fn reorg_path(
    from: &Block,
    mut parent_of: impl FnMut(Hash) -> Option<Block>,
    mut already_agrees: impl FnMut(u64, Hash) -> bool,
) -> Vec<Block> {
    let mut path = Vec::new();
    let mut current = from.clone();
    loop {
        if already_agrees(current.number(), current.hash()) {
            break;
        }
        let parent_hash = current.parent_hash();
        path.push(current.clone());
        if current.number() == 0 {
            break;
        }
        match parent_of(parent_hash) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}
