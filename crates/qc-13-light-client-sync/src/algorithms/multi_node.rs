//! # Multi-Node Consensus
//!
//! Query multiple full nodes and require agreement.
//!
//! Reference: System.md Line 644, SPEC-13 Lines 579-617

use crate::domain::{LightClientError, CONSENSUS_THRESHOLD};

/// Check if responses from multiple nodes reach consensus.
///
/// Reference: SPEC-13 Line 606 - "2/3 agreement"
///
/// # Arguments
/// * `responses` - Responses from full nodes
/// * `min_nodes` - Minimum required nodes
///
/// # Returns
/// * `Ok(T)` - The consensus value
/// * `Err` - Not enough nodes or no consensus
pub fn check_consensus<T: Clone + PartialEq>(
    responses: &[T],
    min_nodes: usize,
) -> Result<T, LightClientError> {
    if responses.len() < min_nodes {
        return Err(LightClientError::InsufficientNodes {
            got: responses.len(),
            required: min_nodes,
        });
    }

    if responses.is_empty() {
        return Err(LightClientError::ConsensusFailed(
            "No responses".to_string(),
        ));
    }

    // Count occurrences of each response
    let mut counts: Vec<(T, usize)> = Vec::new();
    for response in responses {
        let found = counts.iter_mut().find(|(r, _)| r == response);
        match found {
            Some((_, count)) => *count += 1,
            None => counts.push((response.clone(), 1)),
        }
    }

    // Find the most common response
    let (best, count) = counts.into_iter().max_by_key(|(_, c)| *c).unwrap();

    // Check if it meets the threshold
    let threshold = (responses.len() as f64 * CONSENSUS_THRESHOLD).ceil() as usize;
    if count < threshold {
        return Err(LightClientError::ConsensusFailed(format!(
            "Only {}/{} nodes agree (need {})",
            count,
            responses.len(),
            threshold
        )));
    }

    Ok(best)
}

/// Verify all responses are identical (strict consensus).
pub fn check_strict_consensus<T: Clone + PartialEq>(
    responses: &[T],
    min_nodes: usize,
) -> Result<T, LightClientError> {
    if responses.len() < min_nodes {
        return Err(LightClientError::InsufficientNodes {
            got: responses.len(),
            required: min_nodes,
        });
    }

    if responses.is_empty() {
        return Err(LightClientError::ConsensusFailed(
            "No responses".to_string(),
        ));
    }

    let first = &responses[0];
    if responses.iter().all(|r| r == first) {
        Ok(first.clone())
    } else {
        Err(LightClientError::ForkDetected)
    }
}

/// Calculate required number of agreeing nodes for consensus.
pub fn required_for_consensus(total: usize) -> usize {
    (total as f64 * CONSENSUS_THRESHOLD).ceil() as usize
}
