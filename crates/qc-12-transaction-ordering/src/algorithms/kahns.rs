//! Kahn's Topological Sort Algorithm
//!
//! Reference: System.md Lines 587-594
//! O(V + E) complexity, detects cycles, enables parallelism

use crate::domain::entities::{DependencyGraph, ExecutionSchedule, ParallelGroup};
use crate::domain::errors::OrderingError;
use crate::domain::value_objects::Hash;
use std::collections::HashMap;

/// Perform Kahn's topological sort on the dependency graph.
///
/// Returns an ExecutionSchedule with parallel groups.
/// Transactions in the same group can execute concurrently.
///
/// Reference: System.md Lines 587-588
/// "Topological Sort (Kahn's Algorithm) - O(V + E) complexity, detects cycles, enables parallelism"
pub fn kahns_topological_sort(graph: &DependencyGraph) -> Result<ExecutionSchedule, OrderingError> {
    if graph.transactions.is_empty() {
        return Ok(ExecutionSchedule::new(vec![]));
    }

    // 1. Copy in-degree map (we'll modify it)
    let mut in_degree: HashMap<Hash, usize> = graph.in_degree.clone();

    // 2. Initialize queue with zero in-degree nodes
    let mut queue: Vec<Hash> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(hash, _)| *hash)
        .collect();

    // 3. Sort for determinism (System.md Line 608: "Deterministic Ordering")
    queue.sort();

    // 4. Process queue, building parallel groups
    let mut groups: Vec<ParallelGroup> = Vec::new();
    let mut scheduled_count = 0;

    while !queue.is_empty() {
        // All nodes in current queue have zero in-degree - they can run in parallel
        let current_group: Vec<Hash> = std::mem::take(&mut queue);
        let group_size = current_group.len();

        // Create parallel group
        groups.push(ParallelGroup::new(groups.len(), current_group.clone()));
        scheduled_count += group_size;

        // Find next batch of zero in-degree nodes
        let mut next_queue: Vec<Hash> = Vec::new();

        for node in &current_group {
            let Some(neighbors) = graph.adjacency.get(node) else {
                continue;
            };
            for neighbor in neighbors {
                let Some(degree) = in_degree.get_mut(neighbor) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    next_queue.push(*neighbor);
                }
            }
        }

        // Sort next queue for determinism
        next_queue.sort();
        queue = next_queue;
    }

    // 5. Cycle detection: if not all nodes scheduled, there's a cycle
    if scheduled_count < graph.transactions.len() {
        return Err(OrderingError::CycleDetected);
    }

    Ok(ExecutionSchedule::new(groups))
}
