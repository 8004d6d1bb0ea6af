use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::emission_factor::{EmissionFactorRecord, Scope};

const BASE_SELECT: &str = r#"
    SELECT
        ef_id,
        scope,
        group_name,
        activity_name,
        description,
        dimension,
        base_unit,
        factor_per_base_unit
    FROM emission_factors
"#;

const ORDER_BY: &str = "ORDER BY scope, group_name, activity_name, ef_id";

#[derive(Debug, Clone)]
pub struct EmissionFactorRow {
    pub ef_id: String,
    pub scope: i64,
    pub group_name: String,
    pub activity_name: String,
    pub description: String,
    pub dimension: String,
    pub base_unit: String,
    pub factor_per_base_unit: f64,
}

impl EmissionFactorRow {
    pub fn from_record(record: &EmissionFactorRecord) -> Self {
        Self {
            ef_id: record.ef_id.clone(),
            scope: i64::from(record.scope.as_u8()),
            group_name: record.group_name.clone(),
            activity_name: record.activity_name.clone(),
            description: record.description.clone(),
            dimension: record.dimension.as_str().to_string(),
            base_unit: record.base_unit.as_str().to_string(),
            factor_per_base_unit: record.factor_per_base_unit,
        }
    }

    pub fn into_record(self) -> AppResult<EmissionFactorRecord> {
        let scope = u8::try_from(self.scope)
            .ok()
            .and_then(Scope::from_u8)
            .ok_or_else(|| AppError::database(format!("invalid stored scope {}", self.scope)))?;

        Ok(EmissionFactorRecord {
            ef_id: self.ef_id,
            scope,
            group_name: self.group_name,
            activity_name: self.activity_name,
            description: self.description,
            dimension: self.dimension.parse()?,
            base_unit: self.base_unit.parse()?,
            factor_per_base_unit: self.factor_per_base_unit,
        })
    }
}

impl TryFrom<&Row<'_>> for EmissionFactorRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(EmissionFactorRow {
            ef_id: row.get("ef_id")?,
            scope: row.get("scope")?,
            group_name: row.get("group_name")?,
            activity_name: row.get("activity_name")?,
            description: row.get("description")?,
            dimension: row.get("dimension")?,
            base_unit: row.get("base_unit")?,
            factor_per_base_unit: row.get("factor_per_base_unit")?,
        })
    }
}

pub struct EmissionFactorRepository;

impl EmissionFactorRepository {
    pub fn insert(conn: &Connection, row: &EmissionFactorRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO emission_factors (
                    ef_id,
                    scope,
                    group_name,
                    activity_name,
                    description,
                    dimension,
                    base_unit,
                    factor_per_base_unit
                ) VALUES (
                    :ef_id,
                    :scope,
                    :group_name,
                    :activity_name,
                    :description,
                    :dimension,
                    :base_unit,
                    :factor_per_base_unit
                )
            "#,
            named_params! {
                ":ef_id": &row.ef_id,
                ":scope": row.scope,
                ":group_name": &row.group_name,
                ":activity_name": &row.activity_name,
                ":description": &row.description,
                ":dimension": &row.dimension,
                ":base_unit": &row.base_unit,
                ":factor_per_base_unit": row.factor_per_base_unit,
            },
        )?;

        Ok(())
    }

    /// Removes every factor in scopes 1–3, returning how many rows went away.
    pub fn delete_all_scoped(conn: &Connection) -> AppResult<usize> {
        let affected = conn.execute("DELETE FROM emission_factors WHERE scope IN (1, 2, 3)", [])?;
        Ok(affected)
    }

    pub fn find_by_id(conn: &Connection, ef_id: &str) -> AppResult<Option<EmissionFactorRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE ef_id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([ef_id], |row| EmissionFactorRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<EmissionFactorRow>> {
        let mut stmt = conn.prepare(&format!("{} {}", BASE_SELECT, ORDER_BY))?;
        let rows = stmt
            .query_map([], |row| EmissionFactorRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_by_scope(conn: &Connection, scope: Scope) -> AppResult<Vec<EmissionFactorRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE scope = ?1 {}", BASE_SELECT, ORDER_BY))?;
        let rows = stmt
            .query_map([i64::from(scope.as_u8())], |row| EmissionFactorRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
