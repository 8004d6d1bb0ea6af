use std::path::Path;

use tracing::debug;

use crate::models::emission_factor::{ImportReport, ImportRunRecord};

use super::{run_command, AppState, CommandResult};

pub fn ef_import(state: &AppState, source: &Path) -> CommandResult<ImportReport> {
    debug!(target: "app::command", source = %source.display(), "ef_import");
    run_command(|| state.importer().import_file(source))
}

pub fn ef_import_runs(state: &AppState, limit: Option<usize>) -> CommandResult<Vec<ImportRunRecord>> {
    run_command(|| state.importer().list_runs(limit))
}
