use tracing::debug;

use crate::db::repositories::emission_factor_repository::{
    EmissionFactorRepository, EmissionFactorRow,
};
use crate::db::repositories::unit_repository::{UnitRepository, UnitRow};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::emission_factor::{EmissionFactorRecord, Scope};
use crate::models::unit::UnitDefinition;

/// Read access to the emission factor and unit catalogs.
#[derive(Clone)]
pub struct CatalogService {
    db: DbPool,
}

impl CatalogService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn list_factors(&self, scope: Option<Scope>) -> AppResult<Vec<EmissionFactorRecord>> {
        let rows = self.db.with_connection(|conn| match scope {
            Some(scope) => EmissionFactorRepository::list_by_scope(conn, scope),
            None => EmissionFactorRepository::list_all(conn),
        })?;
        let factors = rows
            .into_iter()
            .map(EmissionFactorRow::into_record)
            .collect::<AppResult<Vec<_>>>()?;
        debug!(target: "app::catalog", count = factors.len(), ?scope, "emission factors listed");
        Ok(factors)
    }

    pub fn get_factor(&self, ef_id: &str) -> AppResult<EmissionFactorRecord> {
        self.db
            .with_connection(|conn| EmissionFactorRepository::find_by_id(conn, ef_id))?
            .ok_or_else(AppError::not_found)?
            .into_record()
    }

    pub fn list_units(&self) -> AppResult<Vec<UnitDefinition>> {
        let rows = self.db.with_connection(|conn| UnitRepository::list_all(conn))?;
        rows.into_iter().map(UnitRow::into_definition).collect()
    }

    pub fn get_unit(&self, unit_id: &str) -> AppResult<UnitDefinition> {
        self.db
            .with_connection(|conn| UnitRepository::find_by_id(conn, unit_id))?
            .ok_or_else(AppError::not_found)?
            .into_definition()
    }

    /// Units an activity may be recorded in against the given factor.
    pub fn units_for_ef(&self, ef_id: &str) -> AppResult<Vec<UnitDefinition>> {
        let factor = self.get_factor(ef_id)?;
        let rows = self.db.with_connection(|conn| {
            UnitRepository::list_compatible(conn, factor.dimension, factor.base_unit)
        })?;
        rows.into_iter().map(UnitRow::into_definition).collect()
    }
}
