use tracing::debug;

use crate::error::AppError;
use crate::models::emission_factor::{EmissionFactorRecord, Scope};
use crate::models::unit::UnitDefinition;

use super::{run_command, AppState, CommandResult};

pub fn ef_list(state: &AppState, scope: Option<u8>) -> CommandResult<Vec<EmissionFactorRecord>> {
    debug!(target: "app::command", ?scope, "ef_list");
    run_command(|| {
        let scope = scope.map(parse_scope).transpose()?;
        state.catalog().list_factors(scope)
    })
}

pub fn ef_get(state: &AppState, ef_id: &str) -> CommandResult<EmissionFactorRecord> {
    run_command(|| state.catalog().get_factor(ef_id.trim()))
}

/// All units, or only those an activity against `ef_id` may use.
pub fn units_list(state: &AppState, ef_id: Option<&str>) -> CommandResult<Vec<UnitDefinition>> {
    debug!(target: "app::command", ?ef_id, "units_list");
    run_command(|| match ef_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(ef_id) => state.catalog().units_for_ef(ef_id),
        None => state.catalog().list_units(),
    })
}

pub(crate) fn parse_scope(value: u8) -> Result<Scope, AppError> {
    Scope::from_u8(value)
        .ok_or_else(|| AppError::validation(format!("scope must be 1, 2 or 3 (got {value})")))
}
