use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::db::repositories::activity_repository::{ActivityRepository, ActivityRow};
use crate::db::repositories::emission_factor_repository::EmissionFactorRepository;
use crate::db::repositories::unit_repository::UnitRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::activity::{
    ActivityCreateInput, ActivityRecord, ActivityStatus, ActivityView,
};
use crate::services::emission_calculator::compute_emission;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_DESCRIPTION_CHARS: usize = 200;

#[derive(Clone)]
pub struct ActivityService {
    db: DbPool,
}

impl ActivityService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Validates the input against the catalog, computes its emission and stores it.
    pub fn create_activity(&self, input: ActivityCreateInput) -> AppResult<ActivityRecord> {
        let description = normalize_description(&input.description)?;
        let date = normalize_date(&input.date)?;
        let amount = normalize_amount(input.amount)?;
        let remark = normalize_optional_string(input.remark);

        let (factor, unit) = self.db.with_connection(|conn| {
            let factor = EmissionFactorRepository::find_by_id(conn, input.ef_id.trim())?
                .ok_or_else(|| {
                    AppError::validation(format!("unknown emission factor {}", input.ef_id.trim()))
                })?
                .into_record()?;
            let unit = UnitRepository::find_by_id(conn, input.unit_id.trim())?
                .ok_or_else(|| {
                    AppError::validation(format!("unknown unit {}", input.unit_id.trim()))
                })?
                .into_definition()?;
            Ok((factor, unit))
        })?;

        if !unit.is_compatible_with(&factor) {
            return Err(AppError::DimensionUnitMismatch {
                ef_id: factor.ef_id,
                ef_dimension: factor.dimension.to_string(),
                ef_base: factor.base_unit.to_string(),
                unit_id: unit.unit_id,
                unit_dimension: unit.dimension.to_string(),
                unit_base: unit.base_unit.to_string(),
            });
        }

        if let Some(scope) = input.scope {
            if scope != factor.scope {
                return Err(AppError::validation(format!(
                    "scope {scope} does not match emission factor {} (scope {})",
                    factor.ef_id, factor.scope
                )));
            }
        }

        let emission = compute_emission(amount, unit.to_base_factor, factor.factor_per_base_unit);
        let now = Utc::now().to_rfc3339();
        let record = ActivityRecord {
            activity_id: format!("ACT-{}", uuid::Uuid::new_v4().simple()),
            description,
            date,
            scope: factor.scope,
            ef_id: factor.ef_id,
            unit_id: unit.unit_id,
            amount,
            remark,
            emission,
            status: ActivityStatus::Active,
            created_at: now.clone(),
            updated_at: now,
        };

        let row = ActivityRow::from_record(&record);
        self.db
            .with_connection(|conn| ActivityRepository::insert(conn, &row))?;
        info!(
            target: "app::activity",
            activity_id = %record.activity_id,
            ef_id = %record.ef_id,
            kgco2e = record.emission.kgco2e,
            "activity recorded"
        );
        Ok(record)
    }

    pub fn get_activity(&self, activity_id: &str) -> AppResult<ActivityView> {
        self.db
            .with_connection(|conn| ActivityRepository::find_by_id(conn, activity_id))?
            .ok_or_else(AppError::not_found)?
            .into_view()
    }

    /// Active activities with catalog names, newest date first.
    pub fn list_activities(&self) -> AppResult<Vec<ActivityView>> {
        let rows = self
            .db
            .with_connection(|conn| ActivityRepository::list_active(conn))?;
        let views = rows
            .into_iter()
            .map(ActivityRow::into_view)
            .collect::<AppResult<Vec<_>>>()?;
        debug!(target: "app::activity", count = views.len(), "activities listed");
        Ok(views)
    }

    pub fn list_active_records(&self) -> AppResult<Vec<ActivityRecord>> {
        let rows = self
            .db
            .with_connection(|conn| ActivityRepository::list_active(conn))?;
        rows.into_iter().map(ActivityRow::into_record).collect()
    }

    /// Soft-deletes an activity. Deleting an already deleted activity is a no-op.
    pub fn delete_activity(&self, activity_id: &str) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.db.with_connection(|conn| {
            if ActivityRepository::find_by_id(conn, activity_id)?.is_none() {
                return Err(AppError::not_found());
            }
            ActivityRepository::mark_deleted(conn, activity_id, &now)
        })?;

        if changed {
            info!(target: "app::activity", activity_id, "activity deleted");
        } else {
            debug!(target: "app::activity", activity_id, "activity already deleted");
        }
        Ok(())
    }

    pub fn count_by_status(&self, status: ActivityStatus) -> AppResult<i64> {
        self.db
            .with_connection(|conn| ActivityRepository::count_by_status(conn, status))
    }
}

fn normalize_description(description: &str) -> AppResult<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("activity description cannot be empty"));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AppError::validation(format!(
            "activity description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_date(date: &str) -> AppResult<String> {
    let trimmed = date.trim();
    let parsed = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("date must be YYYY-MM-DD, got \"{trimmed}\"")))?;
    Ok(parsed.format(DATE_FORMAT).to_string())
}

fn normalize_amount(amount: f64) -> AppResult<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::validation("amount must be a positive number"));
    }
    Ok(amount)
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
