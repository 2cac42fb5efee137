//! Repair planning for primary-key sequences.
//!
//! The runtime crate discovers one [`SequenceRecord`] per sequence-backed
//! primary-key column and asks [`plan_repair`] what to do with it. Planning
//! is pure so the skip rules can be tested without a database.

use std::fmt;

/// A sequence-backed primary-key column, as discovered from the catalog.
///
/// Recomputed on every pass and discarded afterwards; nothing here is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Namespace containing the table.
    pub schema: String,
    /// Table owning the primary key.
    pub table: String,
    /// Primary-key column driven by the sequence.
    pub column: String,
    /// Name of the backing sequence.
    pub sequence: String,
    /// The sequence's recorded value; `None` if it was never advanced.
    pub last_value: Option<i64>,
    /// The sequence's configured starting value.
    pub start_value: i64,
    /// Maximum value currently stored in the column; `None` on an empty table.
    pub max_id: Option<i64>,
}

impl SequenceRecord {
    /// The sequence's quoted, schema-qualified name, suitable for a
    /// `regclass` cast.
    pub fn qualified_sequence(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.sequence))
    }
}

/// What the repair pass should do with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    /// Leave the sequence untouched.
    Skip(SkipReason),
    /// Set the sequence to `new_value` so the next generated value is
    /// strictly greater than every stored key.
    Advance {
        /// Recorded value before the repair; `None` for a never-advanced
        /// sequence.
        previous: Option<i64>,
        new_value: i64,
    },
}

/// Why a record was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The table has no rows, so there is nothing to collide with.
    EmptyTable,
    /// The sequence was never advanced and its start value already clears
    /// the stored maximum.
    UnusedAboveMax,
    /// The recorded value already covers the stored maximum.
    AlreadyAhead,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyTable => write!(f, "table is empty"),
            SkipReason::UnusedAboveMax => write!(f, "unused, start value above max id"),
            SkipReason::AlreadyAhead => write!(f, "already ahead of max id"),
        }
    }
}

/// Decide whether a sequence needs repair.
///
/// A sequence is advanced to the column's maximum stored value unless the
/// table is empty, the sequence is already at or past that maximum, or the
/// sequence was never advanced and starts above it. A never-advanced
/// sequence starting at or below the maximum IS advanced; only the
/// above-maximum case leaves a fresh sequence at its configured floor.
pub fn plan_repair(record: &SequenceRecord) -> RepairAction {
    let max_id = match record.max_id {
        None => return RepairAction::Skip(SkipReason::EmptyTable),
        Some(max_id) => max_id,
    };

    match record.last_value {
        None if record.start_value > max_id => RepairAction::Skip(SkipReason::UnusedAboveMax),
        Some(last_value) if last_value >= max_id => RepairAction::Skip(SkipReason::AlreadyAhead),
        previous => RepairAction::Advance {
            previous,
            new_value: max_id,
        },
    }
}

/// One applied (or planned) adjustment, for operator visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedSequence {
    pub schema: String,
    pub table: String,
    pub sequence: String,
    /// Value before the adjustment; `None` for a never-advanced sequence.
    pub previous: Option<i64>,
    pub new_value: i64,
}

impl fmt::Display for RepairedSequence {
    /// Renders the diagnostic line, e.g. `orders, (3) --> (7)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.previous {
            Some(previous) => write!(
                f,
                "{}, ({}) --> ({})",
                self.table, previous, self.new_value
            ),
            None => write!(f, "{}, (-) --> ({})", self.table, self.new_value),
        }
    }
}

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(last_value: Option<i64>, start_value: i64, max_id: Option<i64>) -> SequenceRecord {
        SequenceRecord {
            schema: "public".to_string(),
            table: "orders".to_string(),
            column: "id".to_string(),
            sequence: "orders_id_seq".to_string(),
            last_value,
            start_value,
            max_id,
        }
    }

    #[test]
    fn test_advances_behind_sequence() {
        // Rows {1,2,3,7} with last_value 3 must advance to 7.
        let action = plan_repair(&record(Some(3), 1, Some(7)));
        assert_eq!(
            action,
            RepairAction::Advance {
                previous: Some(3),
                new_value: 7
            }
        );
    }

    #[test]
    fn test_empty_table_is_untouched() {
        let action = plan_repair(&record(None, 1, None));
        assert_eq!(action, RepairAction::Skip(SkipReason::EmptyTable));

        // Even a sequence that has been advanced is left alone on an empty table.
        let action = plan_repair(&record(Some(100), 1, None));
        assert_eq!(action, RepairAction::Skip(SkipReason::EmptyTable));
    }

    #[test]
    fn test_already_ahead_is_untouched() {
        let action = plan_repair(&record(Some(7), 1, Some(7)));
        assert_eq!(action, RepairAction::Skip(SkipReason::AlreadyAhead));

        let action = plan_repair(&record(Some(50), 1, Some(7)));
        assert_eq!(action, RepairAction::Skip(SkipReason::AlreadyAhead));
    }

    #[test]
    fn test_fresh_sequence_above_max_is_untouched() {
        // Never advanced, configured to start at 1000, rows only reach 7.
        let action = plan_repair(&record(None, 1000, Some(7)));
        assert_eq!(action, RepairAction::Skip(SkipReason::UnusedAboveMax));
    }

    #[test]
    fn test_fresh_sequence_below_max_is_advanced() {
        // The floor check only protects sequences starting ABOVE the max;
        // a fresh sequence starting at or below it would hand out colliding
        // keys and must be advanced.
        let action = plan_repair(&record(None, 1, Some(7)));
        assert_eq!(
            action,
            RepairAction::Advance {
                previous: None,
                new_value: 7
            }
        );

        let action = plan_repair(&record(None, 7, Some(7)));
        assert_eq!(
            action,
            RepairAction::Advance {
                previous: None,
                new_value: 7
            }
        );
    }

    #[test]
    fn test_plan_is_idempotent() {
        let mut rec = record(Some(3), 1, Some(7));
        let action = plan_repair(&rec);
        let RepairAction::Advance { new_value, .. } = action else {
            panic!("expected advance");
        };

        // After applying the advance, a second pass must be a no-op.
        rec.last_value = Some(new_value);
        assert_eq!(
            plan_repair(&rec),
            RepairAction::Skip(SkipReason::AlreadyAhead)
        );
    }

    #[test]
    fn test_diagnostic_format() {
        let repaired = RepairedSequence {
            schema: "public".to_string(),
            table: "orders".to_string(),
            sequence: "orders_id_seq".to_string(),
            previous: Some(3),
            new_value: 7,
        };
        assert_eq!(repaired.to_string(), "orders, (3) --> (7)");
    }

    #[test]
    fn test_diagnostic_format_fresh_sequence() {
        let repaired = RepairedSequence {
            schema: "public".to_string(),
            table: "events".to_string(),
            sequence: "events_id_seq".to_string(),
            previous: None,
            new_value: 42,
        };
        assert_eq!(repaired.to_string(), "events, (-) --> (42)");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("orders"), "\"orders\"");
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn test_qualified_sequence() {
        let rec = record(None, 1, None);
        assert_eq!(rec.qualified_sequence(), "\"public\".\"orders_id_seq\"");
    }
}
