//! Catalog introspection for primary-key sequences.
//!
//! Candidates are discovered by following the `pg_depend` auto dependency
//! (`deptype = 'a'`) from each sequence to the table column that owns it,
//! restricted to columns of the table's primary-key index. Sequence state
//! (`last_value`, `start_value`) comes from the `pg_sequences` view, whose
//! `last_value` is NULL for a never-advanced sequence.

use sqlx::{PgConnection, Row};
use tracing::debug;

use dbmend_core::error::{MendError, Result};
use dbmend_core::sequence::{quote_ident, SequenceRecord};

const CANDIDATE_SQL: &str = r#"
    SELECT ns.nspname::text   AS schema_name,
           tab.relname::text  AS table_name,
           attr.attname::text AS column_name,
           seq.relname::text  AS sequence_name,
           ps.last_value      AS last_value,
           ps.start_value     AS start_value
    FROM pg_class AS seq
    JOIN pg_namespace AS ns
        ON (ns.oid = seq.relnamespace)
    JOIN pg_depend AS dep
        ON (dep.objid = seq.oid AND dep.deptype = 'a')
    JOIN pg_class AS tab
        ON (tab.oid = dep.refobjid)
    JOIN pg_attribute AS attr
        ON (attr.attrelid = tab.oid AND attr.attnum = dep.refobjsubid)
    JOIN pg_index AS idx
        ON (idx.indrelid = tab.oid
            AND idx.indisprimary
            AND attr.attnum = ANY (idx.indkey))
    JOIN pg_sequences AS ps
        ON (ps.schemaname = ns.nspname AND ps.sequencename = seq.relname)
    WHERE seq.relkind = 'S'
    ORDER BY ns.nspname, tab.relname, seq.relname
"#;

/// Fetch every sequence-backed primary-key column in the database.
///
/// `max_id` is left unset; it is probed per table by [`fetch_max_id`].
pub async fn fetch_candidates(conn: &mut PgConnection) -> Result<Vec<SequenceRecord>> {
    let rows = sqlx::query(CANDIDATE_SQL)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| MendError::Database(format!("Failed to enumerate sequences: {}", e)))?;

    let candidates: Vec<SequenceRecord> = rows
        .iter()
        .map(|row| SequenceRecord {
            schema: row.get("schema_name"),
            table: row.get("table_name"),
            column: row.get("column_name"),
            sequence: row.get("sequence_name"),
            last_value: row.get("last_value"),
            start_value: row.get("start_value"),
            max_id: None,
        })
        .collect();

    debug!("Found {} primary-key sequence(s)", candidates.len());
    Ok(candidates)
}

/// Read the maximum stored value of the record's primary-key column.
///
/// Returns `None` when the table has no rows. Identifiers cannot be bound
/// as parameters, so they are quoted into the statement; the cast keeps
/// smallint and integer keys decodable as one type.
pub async fn fetch_max_id(conn: &mut PgConnection, record: &SequenceRecord) -> Result<Option<i64>> {
    let sql = format!(
        "SELECT MAX({})::bigint FROM {}.{}",
        quote_ident(&record.column),
        quote_ident(&record.schema),
        quote_ident(&record.table),
    );

    let row = sqlx::query(&sql).fetch_one(&mut *conn).await.map_err(|e| {
        MendError::Database(format!(
            "Failed to read max({}) on {}.{}: {}",
            record.column, record.schema, record.table, e
        ))
    })?;

    Ok(row.get(0))
}

/// Set the sequence so its next generated value follows `value`.
pub async fn set_sequence_value(
    conn: &mut PgConnection,
    record: &SequenceRecord,
    value: i64,
) -> Result<()> {
    sqlx::query("SELECT setval($1::regclass, $2)")
        .bind(record.qualified_sequence())
        .bind(value)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            MendError::Database(format!(
                "Failed to set {} to {}: {}",
                record.qualified_sequence(),
                value,
                e
            ))
        })?;

    Ok(())
}
