use std::fs;

use cfo_tracker_lib::db::repositories::emission_factor_repository::EmissionFactorRepository;
use cfo_tracker_lib::db::DbPool;
use cfo_tracker_lib::models::activity::ActivityCreateInput;
use cfo_tracker_lib::models::emission_factor::{BaseUnit, Dimension, Scope};
use cfo_tracker_lib::services::activity_service::ActivityService;
use cfo_tracker_lib::services::catalog_service::CatalogService;
use cfo_tracker_lib::services::ef_import_service::EfImportService;
use tempfile::tempdir;

const SHEET_JSON: &str = r#"[
    {"ชื่อ": "Gasoline", "หน่วย": "litre", "Emission Factors": 2.2394, "Scope": 1},
    {"ชื่อ": "Natural gas", "หน่วย": "scf", "Emission Factors": "0.0551", "Scope": "1"},
    {"ชื่อ": "Grid electricity", "หน่วย": "MWh", "Emission Factors": 499.9, "Scope": "2"},
    {"ชื่อ": "Unknown solvent", "หน่วย": "gallon", "Emission Factors": 3.1, "Scope": "1"},
    {"ชื่อ": "LPG", "หน่วย": "kg", "Emission Factors": 3.1133, "Scope": "1, 3",
     "คำอธิบาย": "Liquefied petroleum gas"},
    {"ชื่อ": "Office paper", "หน่วย": "p (แผ่น)", "Emission Factors": 0.0047, "Scope": 3},
    {"ชื่อ": "", "หน่วย": "kg", "Emission Factors": 1.0, "Scope": 1}
]"#;

#[test]
fn json_sheet_import_fans_out_and_reports_skips() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("import.sqlite")).expect("db pool");
    let source = dir.path().join("factors.json");
    fs::write(&source, SHEET_JSON).expect("write sheet");

    let importer = EfImportService::new(pool.clone());
    let report = importer.import_file(&source).expect("import");

    assert_eq!(report.rows_read, 7);
    assert_eq!(report.records_imported, 6);
    assert_eq!(report.source_digest.len(), 64);
    let skipped: Vec<(usize, &str)> = report
        .skipped
        .iter()
        .map(|skip| (skip.row, skip.code.as_str()))
        .collect();
    assert_eq!(skipped, vec![(4, "UNKNOWN_UNIT"), (7, "INCOMPLETE_ROW")]);
    assert!(report.skipped[0].reason.contains("gallon"));

    let catalog = CatalogService::new(pool.clone());
    let lpg_direct = catalog.get_factor("EF0005_S1").expect("scope 1 copy");
    let lpg_other = catalog.get_factor("EF0005_S3").expect("scope 3 copy");
    assert_eq!(lpg_direct.scope, Scope::Direct);
    assert_eq!(lpg_other.scope, Scope::OtherIndirect);
    assert_eq!(lpg_direct.description, "Liquefied petroleum gas");
    assert_eq!(lpg_direct.factor_per_base_unit, lpg_other.factor_per_base_unit);
    assert!(catalog.get_factor("EF0005").is_err());

    let grid = catalog.get_factor("EF0003").expect("grid");
    assert_eq!(grid.base_unit, BaseUnit::KilowattHour);
    assert!((grid.factor_per_base_unit - 0.4999).abs() < 1e-12);

    let gas = catalog.get_factor("EF0002").expect("natural gas");
    assert_eq!(gas.dimension, Dimension::Volume);
    assert_eq!(gas.base_unit, BaseUnit::StandardCubicFoot);

    let paper = catalog.get_factor("EF0006").expect("paper");
    assert_eq!(paper.base_unit, BaseUnit::Sheet);
    let paper_units = catalog.units_for_ef("EF0006").expect("paper units");
    let ids: Vec<&str> = paper_units.iter().map(|unit| unit.unit_id.as_str()).collect();
    assert_eq!(ids, vec!["U_COUNT_P_SHEET"]);
}

#[test]
fn re_import_replaces_catalog_and_keeps_activity_emissions() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("reimport.sqlite")).expect("db pool");
    let importer = EfImportService::new(pool.clone());
    let activities = ActivityService::new(pool.clone());

    let first = dir.path().join("v1.yaml");
    fs::write(
        &first,
        "- name: Diesel\n  unit: L\n  Emission Factors: 2.7\n  Scope: 1\n\
         - name: Grid\n  unit: kWh\n  Emission Factors: 0.5\n  Scope: 2\n",
    )
    .expect("write v1");
    importer.import_file(&first).expect("first import");

    let logged = activities
        .create_activity(ActivityCreateInput {
            description: "Forklift".into(),
            date: "2024-06-03".into(),
            ef_id: "EF0001".into(),
            unit_id: "U_VOL_LITRE".into(),
            amount: 100.0,
            ..Default::default()
        })
        .expect("activity");
    assert!((logged.emission.kgco2e - 270.0).abs() < 1e-9);

    let second = dir.path().join("v2.yaml");
    fs::write(
        &second,
        "- name: Diesel\n  unit: L\n  Emission Factors: 3.0\n  Scope: 1\n",
    )
    .expect("write v2");
    let report = importer.import_file(&second).expect("second import");
    assert_eq!(report.records_imported, 1);

    let ids: Vec<String> = pool
        .with_connection(|conn| EmissionFactorRepository::list_all(conn))
        .expect("list")
        .into_iter()
        .map(|row| row.ef_id)
        .collect();
    assert_eq!(ids, vec!["EF0001".to_string()]);

    let stored = activities.get_activity(&logged.activity_id).expect("activity");
    assert_eq!(stored.activity.emission, logged.emission);

    let runs = importer.list_runs(Some(10)).expect("runs");
    assert_eq!(runs.len(), 2);
    assert_ne!(runs[0].source_digest, runs[1].source_digest);
}

#[test]
fn importing_the_same_sheet_twice_is_idempotent() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("idempotent.sqlite")).expect("db pool");
    let source = dir.path().join("factors.json");
    fs::write(&source, SHEET_JSON).expect("write sheet");

    let importer = EfImportService::new(pool.clone());
    let catalog = CatalogService::new(pool);

    let first = importer.import_file(&source).expect("first");
    let after_first = catalog.list_factors(None).expect("list");
    let second = importer.import_file(&source).expect("second");
    let after_second = catalog.list_factors(None).expect("list");

    assert_eq!(after_first, after_second);
    assert_eq!(first.source_digest, second.source_digest);
    assert_eq!(first.skipped, second.skipped);
}

#[test]
fn malformed_source_aborts_without_touching_catalog() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("malformed.sqlite")).expect("db pool");
    let source = dir.path().join("broken.json");
    fs::write(&source, "{ not an array").expect("write");

    let importer = EfImportService::new(pool.clone());
    let err = importer.import_file(&source).expect_err("malformed json");
    assert_eq!(err.code(), "SERIALIZATION_ERROR");

    let catalog = CatalogService::new(pool);
    assert_eq!(catalog.list_factors(None).expect("list").len(), 3);
    assert!(importer.list_runs(None).expect("runs").is_empty());
}

#[test]
fn numeric_cells_and_stray_elements_only_skip_their_row() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("numeric.sqlite")).expect("db pool");
    let source = dir.path().join("numeric.json");
    fs::write(
        &source,
        r#"[
            {"ชื่อ": "Diesel", "หน่วย": "L", "Emission Factors": 2.7078, "Scope": 1},
            {"ชื่อ": 404, "หน่วย": "kg", "Emission Factors": 1.25, "Scope": 3},
            {"ชื่อ": "Grid", "หน่วย": "kWh", "Emission Factors": 0.4999, "Scope": 2, "คำอธิบาย": 2024},
            "stray note",
            {"ชื่อ": null, "หน่วย": "kg", "Emission Factors": 1.0, "Scope": 1}
        ]"#,
    )
    .expect("write sheet");

    let importer = EfImportService::new(pool.clone());
    let report = importer.import_file(&source).expect("import");

    assert_eq!(report.rows_read, 5);
    assert_eq!(report.records_imported, 3);
    let skipped: Vec<(usize, &str)> = report
        .skipped
        .iter()
        .map(|skip| (skip.row, skip.code.as_str()))
        .collect();
    assert_eq!(skipped, vec![(4, "MALFORMED_ROW"), (5, "INCOMPLETE_ROW")]);

    let catalog = CatalogService::new(pool);
    let numbered = catalog.get_factor("EF0002").expect("numeric name");
    assert_eq!(numbered.activity_name, "404");
    assert_eq!(numbered.description, "404");
    assert_eq!(numbered.scope, Scope::OtherIndirect);

    let grid = catalog.get_factor("EF0003").expect("grid");
    assert_eq!(grid.description, "2024");
    assert_eq!(catalog.list_factors(None).expect("list").len(), 3);
}
