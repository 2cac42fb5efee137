//! The sequence repair pass.
//!
//! One transaction per pass: every candidate is examined and, where needed,
//! advanced inside the same transaction, so a failure on any iteration rolls
//! back the whole pass and surfaces to the operator.

use sqlx::PgPool;
use tracing::{debug, info};

use dbmend_core::error::{MendError, Result};
use dbmend_core::sequence::{plan_repair, RepairAction, RepairedSequence, SequenceRecord};

use super::catalog;

/// Runs the repair pass over every primary-key sequence.
pub struct SequenceRepairer {
    pool: PgPool,
}

impl SequenceRepairer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Examine every candidate and advance the ones that have fallen behind.
    ///
    /// With `dry_run` the pass plans every adjustment but rolls the
    /// transaction back instead of committing, leaving the database
    /// untouched.
    pub async fn run(&self, dry_run: bool) -> Result<RepairReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MendError::Database(format!("Failed to begin transaction: {}", e)))?;

        let candidates = catalog::fetch_candidates(&mut tx).await?;
        let mut outcomes = Vec::with_capacity(candidates.len());

        for mut record in candidates {
            record.max_id = catalog::fetch_max_id(&mut tx, &record).await?;
            let action = plan_repair(&record);

            match &action {
                RepairAction::Skip(reason) => {
                    debug!(
                        "Skipping {}.{} ({}): {}",
                        record.schema, record.table, record.sequence, reason
                    );
                }
                RepairAction::Advance {
                    previous,
                    new_value,
                } => {
                    if !dry_run {
                        catalog::set_sequence_value(&mut tx, &record, *new_value).await?;
                    }
                    info!(
                        "Sequence {} advanced: {:?} -> {}",
                        record.qualified_sequence(),
                        previous,
                        new_value
                    );
                }
            }

            outcomes.push(RepairOutcome { record, action });
        }

        if dry_run {
            tx.rollback()
                .await
                .map_err(|e| MendError::Database(format!("Failed to roll back: {}", e)))?;
        } else {
            tx.commit()
                .await
                .map_err(|e| MendError::Database(format!("Failed to commit: {}", e)))?;
        }

        Ok(RepairReport { outcomes })
    }
}

/// One examined candidate and the decision taken for it.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub record: SequenceRecord,
    pub action: RepairAction,
}

/// Result of a repair pass.
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    pub outcomes: Vec<RepairOutcome>,
}

impl RepairReport {
    /// Number of candidates examined.
    pub fn examined(&self) -> usize {
        self.outcomes.len()
    }

    /// The adjustments applied (or planned, on a dry run), in catalog order.
    pub fn repaired(&self) -> Vec<RepairedSequence> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.action {
                RepairAction::Advance {
                    previous,
                    new_value,
                } => Some(RepairedSequence {
                    schema: outcome.record.schema.clone(),
                    table: outcome.record.table.clone(),
                    sequence: outcome.record.sequence.clone(),
                    previous: *previous,
                    new_value: *new_value,
                }),
                RepairAction::Skip(_) => None,
            })
            .collect()
    }

    /// True when the pass changed (or would change) nothing.
    pub fn is_noop(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| matches!(outcome.action, RepairAction::Skip(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbmend_core::sequence::SkipReason;

    fn record(table: &str, last_value: Option<i64>, max_id: Option<i64>) -> SequenceRecord {
        SequenceRecord {
            schema: "public".to_string(),
            table: table.to_string(),
            column: "id".to_string(),
            sequence: format!("{}_id_seq", table),
            last_value,
            start_value: 1,
            max_id,
        }
    }

    fn report_for(records: Vec<SequenceRecord>) -> RepairReport {
        let outcomes = records
            .into_iter()
            .map(|record| {
                let action = plan_repair(&record);
                RepairOutcome { record, action }
            })
            .collect();
        RepairReport { outcomes }
    }

    #[test]
    fn test_report_collects_diagnostics() {
        let report = report_for(vec![
            record("orders", Some(3), Some(7)),
            record("empty_table", None, None),
        ]);

        assert_eq!(report.examined(), 2);
        let repaired = report.repaired();
        assert_eq!(repaired.len(), 1);
        assert_eq!(repaired[0].to_string(), "orders, (3) --> (7)");
        assert!(!report.is_noop());
    }

    #[test]
    fn test_report_noop_when_everything_skipped() {
        let report = report_for(vec![
            record("orders", Some(7), Some(7)),
            record("empty_table", None, None),
        ]);

        assert!(report.is_noop());
        assert!(report.repaired().is_empty());
        assert!(matches!(
            report.outcomes[1].action,
            RepairAction::Skip(SkipReason::EmptyTable)
        ));
    }
}
