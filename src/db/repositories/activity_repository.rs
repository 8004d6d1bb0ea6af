use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::activity::{ActivityRecord, ActivityStatus, ActivityView, EmissionAmount};
use crate::models::emission_factor::Scope;

const BASE_SELECT: &str = r#"
    SELECT
        a.activity_id,
        a.description,
        a.date,
        a.scope,
        a.ef_id,
        a.unit_id,
        a.amount,
        a.remark,
        a.emission_kgco2e,
        a.emission_tco2e,
        a.status,
        a.created_at,
        a.updated_at,
        e.activity_name AS ef_activity_name,
        u.unit_name AS unit_name
    FROM activity_log a
    LEFT JOIN emission_factors e ON a.ef_id = e.ef_id
    LEFT JOIN units u ON a.unit_id = u.unit_id
"#;

#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub activity_id: String,
    pub description: String,
    pub date: String,
    pub scope: i64,
    pub ef_id: String,
    pub unit_id: String,
    pub amount: f64,
    pub remark: Option<String>,
    pub emission_kgco2e: f64,
    pub emission_tco2e: f64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub ef_activity_name: Option<String>,
    pub unit_name: Option<String>,
}

impl ActivityRow {
    pub fn from_record(record: &ActivityRecord) -> Self {
        Self {
            activity_id: record.activity_id.clone(),
            description: record.description.clone(),
            date: record.date.clone(),
            scope: i64::from(record.scope.as_u8()),
            ef_id: record.ef_id.clone(),
            unit_id: record.unit_id.clone(),
            amount: record.amount,
            remark: record.remark.clone(),
            emission_kgco2e: record.emission.kgco2e,
            emission_tco2e: record.emission.tco2e,
            status: record.status.as_str().to_string(),
            created_at: record.created_at.clone(),
            updated_at: record.updated_at.clone(),
            ef_activity_name: None,
            unit_name: None,
        }
    }

    pub fn into_view(self) -> AppResult<ActivityView> {
        let ef_activity_name = self.ef_activity_name.clone();
        let unit_name = self.unit_name.clone();
        Ok(ActivityView {
            activity: self.into_record()?,
            ef_activity_name,
            unit_name,
        })
    }

    pub fn into_record(self) -> AppResult<ActivityRecord> {
        let scope = u8::try_from(self.scope)
            .ok()
            .and_then(Scope::from_u8)
            .ok_or_else(|| AppError::database(format!("invalid stored scope {}", self.scope)))?;
        let status = ActivityStatus::parse(&self.status).ok_or_else(|| {
            AppError::database(format!("invalid stored activity status {}", self.status))
        })?;

        Ok(ActivityRecord {
            activity_id: self.activity_id,
            description: self.description,
            date: self.date,
            scope,
            ef_id: self.ef_id,
            unit_id: self.unit_id,
            amount: self.amount,
            remark: self.remark,
            emission: EmissionAmount {
                kgco2e: self.emission_kgco2e,
                tco2e: self.emission_tco2e,
            },
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<&Row<'_>> for ActivityRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(ActivityRow {
            activity_id: row.get("activity_id")?,
            description: row.get("description")?,
            date: row.get("date")?,
            scope: row.get("scope")?,
            ef_id: row.get("ef_id")?,
            unit_id: row.get("unit_id")?,
            amount: row.get("amount")?,
            remark: row.get("remark")?,
            emission_kgco2e: row.get("emission_kgco2e")?,
            emission_tco2e: row.get("emission_tco2e")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            ef_activity_name: row.get("ef_activity_name")?,
            unit_name: row.get("unit_name")?,
        })
    }
}

pub struct ActivityRepository;

impl ActivityRepository {
    pub fn insert(conn: &Connection, row: &ActivityRow) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO activity_log (
                    activity_id,
                    description,
                    date,
                    scope,
                    ef_id,
                    unit_id,
                    amount,
                    remark,
                    emission_kgco2e,
                    emission_tco2e,
                    status,
                    created_at,
                    updated_at
                ) VALUES (
                    :activity_id,
                    :description,
                    :date,
                    :scope,
                    :ef_id,
                    :unit_id,
                    :amount,
                    :remark,
                    :emission_kgco2e,
                    :emission_tco2e,
                    :status,
                    :created_at,
                    :updated_at
                )
            "#,
            named_params! {
                ":activity_id": &row.activity_id,
                ":description": &row.description,
                ":date": &row.date,
                ":scope": row.scope,
                ":ef_id": &row.ef_id,
                ":unit_id": &row.unit_id,
                ":amount": row.amount,
                ":remark": &row.remark,
                ":emission_kgco2e": row.emission_kgco2e,
                ":emission_tco2e": row.emission_tco2e,
                ":status": &row.status,
                ":created_at": &row.created_at,
                ":updated_at": &row.updated_at,
            },
        )?;

        Ok(())
    }

    /// Flips an active activity to deleted. Returns false when nothing was active.
    pub fn mark_deleted(conn: &Connection, activity_id: &str, updated_at: &str) -> AppResult<bool> {
        let affected = conn.execute(
            r#"
                UPDATE activity_log SET
                    status = 'deleted',
                    updated_at = :updated_at
                WHERE activity_id = :activity_id AND status = 'active'
            "#,
            named_params! {
                ":activity_id": activity_id,
                ":updated_at": updated_at,
            },
        )?;
        Ok(affected > 0)
    }

    pub fn find_by_id(conn: &Connection, activity_id: &str) -> AppResult<Option<ActivityRow>> {
        let mut stmt = conn.prepare(&format!("{} WHERE a.activity_id = ?1", BASE_SELECT))?;
        let row = stmt
            .query_row([activity_id], |row| ActivityRow::try_from(row))
            .optional()?;
        Ok(row)
    }

    pub fn list_active(conn: &Connection) -> AppResult<Vec<ActivityRow>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE a.status = 'active' ORDER BY a.date DESC, a.created_at DESC, a.activity_id DESC",
            BASE_SELECT
        ))?;
        let rows = stmt
            .query_map([], |row| ActivityRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_by_status(conn: &Connection, status: ActivityStatus) -> AppResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM activity_log WHERE status = ?1",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
