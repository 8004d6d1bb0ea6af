use tracing::debug;

use crate::models::summary::{
    MonthlySummaryRow, ReportExportFormat, ReportExportResult, ScopeSummary, SummaryReport,
};

use super::{run_command, AppState, CommandResult};

pub fn summary_by_scope(state: &AppState) -> CommandResult<ScopeSummary> {
    run_command(|| state.reports().scope_summary())
}

pub fn summary_monthly(state: &AppState) -> CommandResult<Vec<MonthlySummaryRow>> {
    run_command(|| state.reports().monthly_summary())
}

pub fn summary_report(state: &AppState) -> CommandResult<SummaryReport> {
    run_command(|| state.reports().build_report())
}

pub fn report_export(
    state: &AppState,
    format: ReportExportFormat,
) -> CommandResult<ReportExportResult> {
    debug!(target: "app::command", ?format, "report_export");
    run_command(|| state.reports().export_report(format))
}
