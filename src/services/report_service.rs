use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::AppResult;
use crate::models::emission_factor::Scope;
use crate::models::summary::{
    MonthlySummaryRow, ReportExportFormat, ReportExportResult, ScopeSummary, SummaryReport,
};
use crate::services::activity_service::ActivityService;
use crate::services::aggregation::{monthly_rollup, scope_totals};
use crate::services::settings_service::SettingsService;

const REPORT_PREFIX: &str = "cfo-monthly-summary";

pub struct ReportService {
    activities: Arc<ActivityService>,
    settings: Arc<SettingsService>,
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(
        activities: Arc<ActivityService>,
        settings: Arc<SettingsService>,
        reports_dir: PathBuf,
    ) -> AppResult<Self> {
        std::fs::create_dir_all(&reports_dir)?;
        Ok(Self {
            activities,
            settings,
            reports_dir,
        })
    }

    pub fn scope_summary(&self) -> AppResult<ScopeSummary> {
        Ok(scope_totals(&self.activities.list_active_records()?))
    }

    pub fn monthly_summary(&self) -> AppResult<Vec<MonthlySummaryRow>> {
        Ok(monthly_rollup(&self.activities.list_active_records()?))
    }

    /// Snapshot of both aggregations over one read of the activity log.
    pub fn build_report(&self) -> AppResult<SummaryReport> {
        let settings = self.settings.get()?;
        let activities = self.activities.list_active_records()?;
        Ok(SummaryReport {
            title: settings.report_title,
            generated_at: Utc::now().to_rfc3339(),
            scopes: scope_totals(&activities),
            monthly: monthly_rollup(&activities),
        })
    }

    pub fn export_report(&self, format: ReportExportFormat) -> AppResult<ReportExportResult> {
        let report = self.build_report()?;
        let decimals = usize::from(self.settings.get()?.report_decimals);

        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let filename = format!("{REPORT_PREFIX}-{timestamp}.{}", format.file_extension());
        let path = self.reports_dir.join(filename);

        match format {
            ReportExportFormat::Markdown => {
                std::fs::write(&path, render_markdown_report(&report, decimals))?;
            }
            ReportExportFormat::Json => {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
            }
        }

        info!(
            target: "app::report",
            path = %path.display(),
            months = report.monthly.len(),
            "summary report exported"
        );

        Ok(ReportExportResult {
            file_path: path.to_string_lossy().to_string(),
            format,
            generated_at: report.generated_at,
            months: report.monthly.len(),
        })
    }
}

pub fn default_reports_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .map(|dir| dir.join("reports"))
        .unwrap_or_else(|| std::env::temp_dir().join("cfo-tracker"))
}

pub fn render_markdown_report(report: &SummaryReport, decimals: usize) -> String {
    let mut content = String::new();
    content.push_str(&format!("# {}\n\n", report.title));
    content.push_str(&format!("Generated: {}\n\n", report.generated_at));

    content.push_str("## Totals by scope\n\n");
    content.push_str("| Scope | kgCO2e | tCO2e |\n|---|---:|---:|\n");
    for scope in Scope::ALL {
        let entry = report.scopes.scopes.iter().find(|entry| entry.scope == scope);
        let (kg, t) = entry
            .map(|entry| (entry.total_kgco2e, entry.total_tco2e))
            .unwrap_or((0.0, 0.0));
        content.push_str(&format!(
            "| Scope {} | {:.*} | {:.*} |\n",
            scope, decimals, kg, decimals, t
        ));
    }
    content.push_str(&format!(
        "| **Total** | {:.*} | {:.*} |\n\n",
        decimals, report.scopes.total_kgco2e, decimals, report.scopes.total_tco2e
    ));

    content.push_str("## Monthly tCO2e\n\n");
    if report.monthly.is_empty() {
        content.push_str("No activities recorded.\n");
        return content;
    }
    content.push_str("| Month | Scope 1 | Scope 2 | Scope 3 | Total |\n|---|---:|---:|---:|---:|\n");
    for row in &report.monthly {
        content.push_str(&format!(
            "| {} | {:.*} | {:.*} | {:.*} | {:.*} |\n",
            row.month,
            decimals,
            row.scope1,
            decimals,
            row.scope2,
            decimals,
            row.scope3,
            decimals,
            row.total
        ));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use crate::models::activity::ActivityCreateInput;
    use crate::models::settings::ReportSettingsUpdate;
    use tempfile::tempdir;

    type Fixture = (
        ReportService,
        Arc<ActivityService>,
        Arc<SettingsService>,
        tempfile::TempDir,
    );

    fn setup_service() -> Fixture {
        let dir = tempdir().expect("temp dir");
        let db_path = dir.path().join("report.sqlite");
        let pool = DbPool::new(db_path.clone()).expect("db pool");
        let activities = Arc::new(ActivityService::new(pool.clone()));
        let settings = Arc::new(SettingsService::new(pool));
        let service = ReportService::new(
            Arc::clone(&activities),
            Arc::clone(&settings),
            default_reports_dir(&db_path),
        )
        .expect("report service");
        (service, activities, settings, dir)
    }

    fn record(activities: &ActivityService, date: &str, ef_id: &str, unit_id: &str, amount: f64) {
        activities
            .create_activity(ActivityCreateInput {
                description: format!("{ef_id} on {date}"),
                date: date.into(),
                ef_id: ef_id.into(),
                unit_id: unit_id.into(),
                amount,
                ..Default::default()
            })
            .expect("create activity");
    }

    #[test]
    fn report_uses_settings_title_and_both_aggregations() {
        let (service, activities, settings, _dir) = setup_service();
        record(&activities, "2024-01-05", "EF011", "U_EN_MWH", 100.0);
        record(&activities, "2024-02-10", "EF005", "U_VOL_LITRE", 1000.0);
        settings
            .update(ReportSettingsUpdate {
                report_title: Some("Plant A".into()),
                report_decimals: None,
            })
            .expect("settings");

        let report = service.build_report().expect("report");
        assert_eq!(report.title, "Plant A");
        assert_eq!(report.monthly.len(), 2);
        assert!((report.scopes.tco2e_for(Scope::Energy) - 49.99).abs() < 1e-9);
        assert!((report.scopes.tco2e_for(Scope::Direct) - 2.7078).abs() < 1e-9);
        assert_eq!(service.monthly_summary().expect("monthly"), report.monthly);
        assert_eq!(service.scope_summary().expect("scopes"), report.scopes);
    }

    #[test]
    fn markdown_export_rounds_to_configured_decimals() {
        let (service, activities, _settings, _dir) = setup_service();
        record(&activities, "2024-01-05", "EF011", "U_EN_MWH", 100.0);

        let result = service.export_report(ReportExportFormat::Markdown).expect("export");
        assert!(result.file_path.ends_with(".md"));
        assert_eq!(result.months, 1);

        let content = std::fs::read_to_string(&result.file_path).expect("read report");
        assert!(content.starts_with("# CFO Monthly Summary"));
        assert!(content.contains("| 2024-01 | 0.00 | 49.99 | 0.00 | 49.99 |"));
        assert!(content.contains("| Scope 3 | 0.00 | 0.00 |"));
    }

    #[test]
    fn json_export_keeps_full_precision() {
        let (service, activities, _settings, _dir) = setup_service();
        record(&activities, "2024-03-01", "EF012", "U_MASS_KG", 1.0);

        let result = service.export_report(ReportExportFormat::Json).expect("export");
        let content = std::fs::read_to_string(&result.file_path).expect("read report");
        let parsed: SummaryReport = serde_json::from_str(&content).expect("parse report");
        assert!((parsed.monthly[0].scope3 - 0.0041597).abs() < 1e-15);
    }

    #[test]
    fn empty_log_renders_placeholder() {
        let (service, _activities, _settings, _dir) = setup_service();
        let report = service.build_report().expect("report");
        assert_eq!(report.scopes.scopes.len(), 3);
        let markdown = render_markdown_report(&report, 2);
        assert!(markdown.contains("No activities recorded."));
    }
}
