use std::path::Path;

use chrono::Utc;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::db::repositories::emission_factor_repository::{
    EmissionFactorRepository, EmissionFactorRow,
};
use crate::db::repositories::import_run_repository::{ImportRunRepository, ImportRunRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::emission_factor::{
    EfSourceRow, EmissionFactorRecord, ImportReport, ImportRunRecord, Scope, SkippedRow,
};
use crate::services::unit_normalizer;

const DEFAULT_RUN_HISTORY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Json,
        }
    }
}

#[derive(Clone)]
pub struct EfImportService {
    db: DbPool,
}

impl EfImportService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn import_file(&self, path: &Path) -> AppResult<ImportReport> {
        info!(target: "app::import", source = %path.display(), "reading emission factor source");
        let bytes = std::fs::read(path)?;
        let rows = parse_source(&bytes, SourceFormat::from_path(path))?;
        self.import_rows(&path.display().to_string(), &bytes, &rows)
    }

    /// Replaces the scope 1–3 catalog with the records built from `rows`.
    ///
    /// Row-level failures, including elements that are not objects, are skipped
    /// and reported; the delete and every insert commit together, so readers see
    /// either the old or the new catalog.
    pub fn import_rows(
        &self,
        source: &str,
        source_bytes: &[u8],
        rows: &[JsonValue],
    ) -> AppResult<ImportReport> {
        let source_digest = format!("{:x}", Sha256::digest(source_bytes));
        info!(
            target: "app::import",
            source,
            rows = rows.len(),
            digest = %source_digest,
            "importing emission factors"
        );

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let seq = index + 1;
            match source_row(row).and_then(|row| build_records(seq, &row)) {
                Ok(mut built) => records.append(&mut built),
                Err(err) if err.is_row_level() => {
                    warn!(target: "app::import", row = seq, code = err.code(), reason = %err, "skipping source row");
                    skipped.push(SkippedRow {
                        row: seq,
                        code: err.code().to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let imported_at = Utc::now().to_rfc3339();
        let ledger = ImportRunRow {
            id: 0,
            source: source.to_string(),
            source_digest: source_digest.clone(),
            rows_read: to_i64(rows.len()),
            records_imported: to_i64(records.len()),
            rows_skipped: to_i64(skipped.len()),
            imported_at: imported_at.clone(),
        };

        self.db.with_transaction(|conn| {
            let removed = EmissionFactorRepository::delete_all_scoped(conn)?;
            debug!(target: "app::import", removed, "cleared scope 1-3 emission factors");
            for record in &records {
                EmissionFactorRepository::insert(conn, &EmissionFactorRow::from_record(record))?;
            }
            ImportRunRepository::insert(conn, &ledger)?;
            Ok(())
        })?;

        info!(
            target: "app::import",
            imported = records.len(),
            skipped = skipped.len(),
            "emission factor import finished"
        );

        Ok(ImportReport {
            source: source.to_string(),
            source_digest,
            rows_read: rows.len(),
            records_imported: records.len(),
            skipped,
            imported_at,
        })
    }

    pub fn list_runs(&self, limit: Option<usize>) -> AppResult<Vec<ImportRunRecord>> {
        let limit = limit.unwrap_or(DEFAULT_RUN_HISTORY);
        let rows = self
            .db
            .with_connection(|conn| ImportRunRepository::list_recent(conn, limit))?;
        Ok(rows.into_iter().map(ImportRunRow::into_record).collect())
    }
}

/// Parses the top-level array only; elements stay loose so one bad row cannot
/// fail the whole source.
pub fn parse_source(bytes: &[u8], format: SourceFormat) -> AppResult<Vec<JsonValue>> {
    let rows = match format {
        SourceFormat::Json => serde_json::from_slice(bytes)?,
        SourceFormat::Yaml => serde_yaml::from_slice(bytes)?,
    };
    Ok(rows)
}

/// Reads one source element as a row; anything but an object is a row-level error.
pub fn source_row(value: &JsonValue) -> AppResult<EfSourceRow> {
    let found = match value {
        JsonValue::Object(_) => {
            return serde_json::from_value(value.clone()).map_err(|err| {
                AppError::MalformedRow {
                    reason: err.to_string(),
                }
            })
        }
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
    };
    Err(AppError::MalformedRow {
        reason: format!("expected an object, found {found}"),
    })
}

/// Builds one record per applicable scope from a source row at 1-based `seq`.
pub fn build_records(seq: usize, row: &EfSourceRow) -> AppResult<Vec<EmissionFactorRecord>> {
    let name = required_text(row.name.as_ref(), "name")?;
    let unit = required_text(row.unit.as_ref(), "unit")?;
    let raw_factor = required_value(row.emission_factor.as_ref(), "emission factor")?;
    let raw_scope = required_value(row.scope.as_ref(), "scope")?;

    let factor = parse_factor(raw_factor)?;
    let scopes = parse_scopes(raw_scope)?;
    let normalized = unit_normalizer::normalize(&unit, factor)?;

    let description = optional_text(row.description.as_ref()).unwrap_or_else(|| name.clone());

    let base_id = format!("EF{seq:04}");
    let fan_out = scopes.len() > 1;

    Ok(scopes
        .into_iter()
        .map(|scope| EmissionFactorRecord {
            ef_id: if fan_out {
                format!("{base_id}_S{scope}")
            } else {
                base_id.clone()
            },
            scope,
            group_name: scope.group_label().to_string(),
            activity_name: name.clone(),
            description: description.clone(),
            dimension: normalized.dimension,
            base_unit: normalized.base_unit,
            factor_per_base_unit: normalized.factor_per_base,
        })
        .collect())
}

/// Parses a comma separated scope list into distinct scopes, first occurrence first.
pub fn parse_scopes(raw: &JsonValue) -> AppResult<Vec<Scope>> {
    let text = json_text(raw);
    let mut scopes = Vec::new();
    for token in text.split(',') {
        if let Some(scope) = scope_from_token(token) {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
    }

    if scopes.is_empty() {
        return Err(AppError::invalid_scope(text));
    }
    Ok(scopes)
}

pub fn parse_factor(raw: &JsonValue) -> AppResult<f64> {
    let value = match raw {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::non_finite_factor(json_text(raw))),
    }
}

fn scope_from_token(token: &str) -> Option<Scope> {
    let value: f64 = token.trim().parse().ok()?;
    if value.fract() != 0.0 || !(1.0..=3.0).contains(&value) {
        return None;
    }
    Scope::from_u8(value as u8)
}

// Numbers and other scalars in text columns are read as their text form.
fn optional_text(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null => None,
        other => {
            let text = json_text(other);
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

fn required_text(value: Option<&JsonValue>, field: &'static str) -> AppResult<String> {
    optional_text(value).ok_or(AppError::IncompleteRow { field })
}

fn required_value<'a>(value: Option<&'a JsonValue>, field: &'static str) -> AppResult<&'a JsonValue> {
    match value {
        None | Some(JsonValue::Null) => Err(AppError::IncompleteRow { field }),
        Some(JsonValue::String(text)) if text.trim().is_empty() => {
            Err(AppError::IncompleteRow { field })
        }
        Some(other) => Ok(other),
    }
}

fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
