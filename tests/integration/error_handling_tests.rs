// Error codes surfaced through the command layer

use std::fs;

use cfo_tracker_lib::commands::activity::{
    activity_create, activity_delete, activity_get, ActivityCreatePayload,
};
use cfo_tracker_lib::commands::catalog::{ef_get, ef_list, units_list};
use cfo_tracker_lib::commands::import::ef_import;
use cfo_tracker_lib::commands::settings::{settings_update, SettingsUpdatePayload};
use cfo_tracker_lib::commands::AppState;
use cfo_tracker_lib::db::DbPool;
use tempfile::tempdir;

fn setup_state() -> (AppState, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("errors.sqlite")).expect("db pool");
    let state = AppState::new(pool, dir.path().join("reports")).expect("app state");
    (state, dir)
}

fn diesel_payload() -> ActivityCreatePayload {
    ActivityCreatePayload {
        description: "Backup generator".into(),
        date: "2024-07-01".into(),
        ef_id: "EF005".into(),
        unit_id: "U_VOL_LITRE".into(),
        amount: 40.0,
        ..Default::default()
    }
}

#[test]
fn unit_from_another_dimension_is_rejected() {
    let (state, _dir) = setup_state();
    let err = activity_create(
        &state,
        ActivityCreatePayload {
            unit_id: "U_EN_KWH".into(),
            ..diesel_payload()
        },
    )
    .expect_err("energy unit against a volume factor");

    assert_eq!(err.code, "DIMENSION_UNIT_MISMATCH");
    let details = err.details.expect("details");
    assert_eq!(details["efDimension"], "volume");
    assert_eq!(details["unitDimension"], "energy");
}

#[test]
fn scope_that_disagrees_with_factor_is_rejected() {
    let (state, _dir) = setup_state();
    let err = activity_create(
        &state,
        ActivityCreatePayload {
            scope: Some(3),
            ..diesel_payload()
        },
    )
    .expect_err("scope mismatch");
    assert_eq!(err.code, "VALIDATION_ERROR");

    let err = ef_list(&state, Some(0)).expect_err("scope 0");
    assert_eq!(err.code, "VALIDATION_ERROR");
}

#[test]
fn missing_records_are_not_found() {
    let (state, _dir) = setup_state();
    assert_eq!(ef_get(&state, "EF404").expect_err("ef").code, "NOT_FOUND");
    assert_eq!(units_list(&state, Some("EF404")).expect_err("units").code, "NOT_FOUND");
    assert_eq!(activity_get(&state, "ACT-none").expect_err("get").code, "NOT_FOUND");
    assert_eq!(activity_delete(&state, "ACT-none").expect_err("delete").code, "NOT_FOUND");
}

#[test]
fn soft_deleted_activity_stays_readable() {
    let (state, _dir) = setup_state();
    let created = activity_create(&state, diesel_payload()).expect("create");
    activity_delete(&state, &created.activity_id).expect("delete");
    activity_delete(&state, &created.activity_id).expect("second delete is a no-op");

    let view = activity_get(&state, &created.activity_id).expect("get");
    assert!(!view.activity.is_active());
}

#[test]
fn import_errors_map_to_codes() {
    let (state, dir) = setup_state();
    let missing = ef_import(&state, &dir.path().join("absent.json")).expect_err("missing file");
    assert_eq!(missing.code, "IO_ERROR");

    let yaml = dir.path().join("bad.yaml");
    fs::write(&yaml, "name: [unterminated").expect("write");
    let bad_yaml = ef_import(&state, &yaml).expect_err("bad yaml");
    assert_eq!(bad_yaml.code, "SERIALIZATION_ERROR");
}

#[test]
fn invalid_settings_are_rejected() {
    let (state, _dir) = setup_state();
    let err = settings_update(
        &state,
        SettingsUpdatePayload {
            report_title: None,
            report_decimals: Some(42),
        },
    )
    .expect_err("decimals out of range");
    assert_eq!(err.code, "VALIDATION_ERROR");
}
