use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};

use crate::error::AppResult;
use crate::models::emission_factor::ImportRunRecord;

#[derive(Debug, Clone)]
pub struct ImportRunRow {
    pub id: i64,
    pub source: String,
    pub source_digest: String,
    pub rows_read: i64,
    pub records_imported: i64,
    pub rows_skipped: i64,
    pub imported_at: String,
}

impl ImportRunRow {
    pub fn into_record(self) -> ImportRunRecord {
        ImportRunRecord {
            id: self.id,
            source: self.source,
            source_digest: self.source_digest,
            rows_read: self.rows_read,
            records_imported: self.records_imported,
            rows_skipped: self.rows_skipped,
            imported_at: self.imported_at,
        }
    }
}

impl TryFrom<&Row<'_>> for ImportRunRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            source: row.get("source")?,
            source_digest: row.get("source_digest")?,
            rows_read: row.get("rows_read")?,
            records_imported: row.get("records_imported")?,
            rows_skipped: row.get("rows_skipped")?,
            imported_at: row.get("imported_at")?,
        })
    }
}

pub struct ImportRunRepository;

impl ImportRunRepository {
    /// Inserts a ledger row; `row.id` is ignored and the new id returned.
    pub fn insert(conn: &Connection, row: &ImportRunRow) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO ef_import_runs (
                    source, source_digest, rows_read, records_imported, rows_skipped, imported_at
                ) VALUES (
                    :source, :source_digest, :rows_read, :records_imported, :rows_skipped, :imported_at
                )
            "#,
            named_params! {
                ":source": &row.source,
                ":source_digest": &row.source_digest,
                ":rows_read": row.rows_read,
                ":records_imported": row.records_imported,
                ":rows_skipped": row.rows_skipped,
                ":imported_at": &row.imported_at,
            },
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_recent(conn: &Connection, limit: usize) -> AppResult<Vec<ImportRunRow>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, source, source_digest, rows_read, records_imported, rows_skipped, imported_at
                FROM ef_import_runs
                ORDER BY id DESC
                LIMIT ?1
            "#,
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map([limit], |row| ImportRunRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
