use std::convert::TryFrom;

use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::emission_factor::{BaseUnit, Dimension};
use crate::models::unit::UnitDefinition;

const BASE_SELECT: &str = r#"
    SELECT unit_id, dimension, unit_name, to_base_factor, base_unit
    FROM units
"#;

#[derive(Debug, Clone)]
pub struct UnitRow {
    pub unit_id: String,
    pub dimension: String,
    pub unit_name: String,
    pub to_base_factor: f64,
    pub base_unit: String,
}

impl UnitRow {
    pub fn into_definition(self) -> AppResult<UnitDefinition> {
        Ok(UnitDefinition {
            unit_id: self.unit_id,
            dimension: self.dimension.parse()?,
            unit_name: self.unit_name,
            to_base_factor: self.to_base_factor,
            base_unit: self.base_unit.parse()?,
        })
    }
}

impl TryFrom<&Row<'_>> for UnitRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            unit_id: row.get("unit_id")?,
            dimension: row.get("dimension")?,
            unit_name: row.get("unit_name")?,
            to_base_factor: row.get("to_base_factor")?,
            base_unit: row.get("base_unit")?,
        })
    }
}

pub struct UnitRepository;

impl UnitRepository {
    pub fn find_by_id(conn: &Connection, unit_id: &str) -> AppResult<Option<UnitRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE unit_id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([unit_id], |row| UnitRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<UnitRow>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY dimension, unit_name", BASE_SELECT))?;
        let rows = stmt
            .query_map([], |row| UnitRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_compatible(
        conn: &Connection,
        dimension: Dimension,
        base_unit: BaseUnit,
    ) -> AppResult<Vec<UnitRow>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE dimension = ?1 AND base_unit = ?2 ORDER BY to_base_factor, unit_name",
            BASE_SELECT
        ))?;
        let rows = stmt
            .query_map([dimension.as_str(), base_unit.as_str()], |row| {
                UnitRow::try_from(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
