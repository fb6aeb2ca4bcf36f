//! Transaction Ordering Service
//!
//! Main service implementing TransactionOrderingApi.
//! Reference: Architecture.md Section 2.1, SPEC-12

use crate::algorithms::{build_dependency_graph, conflict_detector, kahns_topological_sort};
use crate::config::OrderingConfig;
use crate::domain::entities::{AnnotatedTransaction, DependencyGraph, ExecutionSchedule};
use crate::domain::errors::OrderingError;
use crate::ports::inbound::TransactionOrderingApi;
use async_trait::async_trait;

use tracing::{debug, info, warn};

/// Transaction Ordering Service
///
/// Orchestrates the ordering pipeline:
/// 1. Validate input
/// 2. Build dependency graph
/// 3. Check conflict threshold
/// 4. Execute Kahn's algorithm
/// 5. Return execution schedule
pub struct TransactionOrderingService {
    config: OrderingConfig,
}

impl TransactionOrderingService {
    /// Create a new service with default config
    pub fn new() -> Self {
        Self {
            config: OrderingConfig::default(),
        }
    }

    /// Create a new service with custom config
    pub fn with_config(config: OrderingConfig) -> Self {
        Self { config }
    }

    /// Validate batch size and edge count
    fn validate_batch(&self, transactions: &[AnnotatedTransaction]) -> Result<(), OrderingError> {
        if transactions.is_empty() {
            return Err(OrderingError::EmptyBatch);
        }

        if transactions.len() > self.config.max_batch_size {
            return Err(OrderingError::BatchTooLarge {
                size: transactions.len(),
                max: self.config.max_batch_size,
            });
        }

        Ok(())
    }

    /// Check if we should fallback to sequential execution
    fn should_fallback(
        &self,
        conflicts: &[crate::domain::value_objects::Conflict],
        tx_count: usize,
    ) -> bool {
        let percent = conflict_detector::conflict_percentage(conflicts, tx_count);
        percent > self.config.conflict_threshold_percent
    }
}

impl Default for TransactionOrderingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionOrderingApi for TransactionOrderingService {
    async fn order_transactions(
        &self,
        transactions: Vec<AnnotatedTransaction>,
    ) -> Result<ExecutionSchedule, OrderingError> {
        // 1. Validate input
        self.validate_batch(&transactions)?;

        info!(
            tx_count = transactions.len(),
            "Ordering transactions for parallel execution"
        );

        // 2. Detect conflicts
        let conflicts = conflict_detector::detect_conflicts(&transactions);
        debug!(conflict_count = conflicts.len(), "Detected conflicts");

        // 3. Check conflict threshold for fallback
        if self.should_fallback(&conflicts, transactions.len()) {
            warn!(
                conflict_percent =
                    conflict_detector::conflict_percentage(&conflicts, transactions.len()),
                threshold = self.config.conflict_threshold_percent,
                "Conflict threshold exceeded, falling back to sequential"
            );

            let hashes: Vec<_> = transactions.iter().map(|tx| tx.hash).collect();
            return Ok(ExecutionSchedule::sequential(hashes));
        }

        // 4. Build dependency graph
        let graph = self.build_dependency_graph(transactions)?;

        // 5. Validate edge count
        if graph.edge_count() > self.config.max_edge_count {
            return Err(OrderingError::TooManyEdges {
                count: graph.edge_count(),
                max: self.config.max_edge_count,
            });
        }

        // 6. Schedule parallel execution
        let schedule = self.schedule_parallel_execution(&graph)?;

        info!(
            total_transactions = schedule.total_transactions,
            parallel_groups = schedule.parallel_groups.len(),
            max_parallelism = schedule.max_parallelism,
            "Transaction ordering complete"
        );

        Ok(schedule)
    }

    fn build_dependency_graph(
        &self,
        transactions: Vec<AnnotatedTransaction>,
    ) -> Result<DependencyGraph, OrderingError> {
        let graph = build_dependency_graph(transactions);
        Ok(graph)
    }

    fn schedule_parallel_execution(
        &self,
        graph: &DependencyGraph,
    ) -> Result<ExecutionSchedule, OrderingError> {
        kahns_topological_sort(graph)
    }
}
