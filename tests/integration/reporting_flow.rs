use std::fs;
use std::path::PathBuf;

use cfo_tracker_lib::commands::activity::{activity_create, activity_delete, ActivityCreatePayload};
use cfo_tracker_lib::commands::settings::{settings_update, SettingsUpdatePayload};
use cfo_tracker_lib::commands::summary::{
    report_export, summary_by_scope, summary_monthly, summary_report,
};
use cfo_tracker_lib::commands::AppState;
use cfo_tracker_lib::db::DbPool;
use cfo_tracker_lib::models::emission_factor::Scope;
use cfo_tracker_lib::models::summary::ReportExportFormat;
use tempfile::tempdir;

fn setup_state() -> (AppState, PathBuf, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("cfo.sqlite")).expect("db pool");
    let reports_dir = dir.path().join("reports");
    let state = AppState::new(pool, reports_dir.clone()).expect("app state");
    (state, reports_dir, dir)
}

fn log(state: &AppState, date: &str, ef_id: &str, unit_id: &str, amount: f64) -> String {
    activity_create(
        state,
        ActivityCreatePayload {
            description: format!("{ef_id} usage"),
            date: date.into(),
            ef_id: ef_id.into(),
            unit_id: unit_id.into(),
            amount,
            ..Default::default()
        },
    )
    .expect("activity")
    .activity_id
}

#[test]
fn scope_and_monthly_summaries_agree() {
    let (state, _reports, _dir) = setup_state();
    // 100 MWh of grid electricity: 100 * 1000 * 0.4999 kg
    log(&state, "2024-01-15", "EF011", "U_EN_MWH", 100.0);
    log(&state, "2024-01-20", "EF005", "U_VOL_M3", 1.0);
    log(&state, "2024-03-02", "EF012", "U_MASS_TON", 2.0);
    let removed = log(&state, "2024-03-09", "EF012", "U_MASS_KG", 500.0);
    activity_delete(&state, &removed).expect("delete");

    let scopes = summary_by_scope(&state).expect("scopes");
    assert_eq!(scopes.scopes.len(), 3);
    assert!((scopes.tco2e_for(Scope::Energy) - 49.99).abs() < 1e-9);
    assert!((scopes.tco2e_for(Scope::Direct) - 2.7078).abs() < 1e-9);
    assert!((scopes.tco2e_for(Scope::OtherIndirect) - 8.3194).abs() < 1e-9);

    let monthly = summary_monthly(&state).expect("monthly");
    let months: Vec<&str> = monthly.iter().map(|row| row.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-03"]);
    assert_eq!(monthly[1].scope3, monthly[1].total);

    let monthly_grand: f64 = monthly.iter().map(|row| row.total).sum();
    assert!((monthly_grand - scopes.total_tco2e).abs() < 1e-9);
    assert!((scopes.total_kgco2e / 1000.0 - scopes.total_tco2e).abs() < 1e-9);
}

#[test]
fn exports_land_in_reports_dir() {
    let (state, reports_dir, _dir) = setup_state();
    log(&state, "2024-02-01", "EF011", "U_EN_KWH", 1234.0);
    settings_update(
        &state,
        SettingsUpdatePayload {
            report_title: Some("Site B\nemissions".into()),
            report_decimals: Some(3),
        },
    )
    .expect("settings");

    let markdown = report_export(&state, ReportExportFormat::Markdown).expect("markdown");
    let json = report_export(&state, ReportExportFormat::Json).expect("json");

    for result in [&markdown, &json] {
        let path = PathBuf::from(&result.file_path);
        assert_eq!(path.parent(), Some(reports_dir.as_path()));
        assert!(path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("cfo-monthly-summary-")));
    }

    let content = fs::read_to_string(&markdown.file_path).expect("read markdown");
    assert_eq!(content.lines().next(), Some("# Site B emissions"));
    // 1234 kWh * 0.4999 = 616.8766 kg
    assert!(content.contains("| 2024-02 | 0.000 | 0.617 | 0.000 | 0.617 |"));

    let report = summary_report(&state).expect("report");
    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json.file_path).expect("read json"))
            .expect("parse json");
    assert_eq!(exported["title"], "Site B emissions");
    assert_eq!(exported["monthly"][0]["month"], "2024-02");
    assert_eq!(report.monthly.len(), 1);
}

#[test]
fn empty_log_still_reports_every_scope() {
    let (state, _reports, _dir) = setup_state();
    let report = summary_report(&state).expect("report");
    assert!(report.monthly.is_empty());
    assert_eq!(report.scopes.total_tco2e, 0.0);
    let scopes: Vec<Scope> = report.scopes.scopes.iter().map(|entry| entry.scope).collect();
    assert_eq!(scopes, Scope::ALL.to_vec());
}
