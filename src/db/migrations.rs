use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::error::AppResult;

const USER_VERSION: i32 = 3;

#[derive(Debug)]
pub struct MigrationInfo {
    pub version: i32,
    pub description: String,
    pub applied_at: DateTime<Utc>,
}

/// (unit_id, dimension, unit_name, to_base_factor, base_unit)
const SEED_UNITS: &[(&str, &str, &str, f64, &str)] = &[
    ("U_MASS_KG", "mass", "kg", 1.0, "kg"),
    ("U_MASS_TON", "mass", "tonne", 1000.0, "kg"),
    ("U_MASS_MT", "mass", "MT", 1000.0, "kg"),
    ("U_VOL_LITRE", "volume", "litre", 1.0, "L"),
    ("U_VOL_M3", "volume", "m3", 1000.0, "L"),
    ("U_VOL_SCF", "volume", "scf", 1.0, "scf"),
    ("U_EN_KWH", "energy", "kWh", 1.0, "kWh"),
    ("U_EN_MWH", "energy", "MWh", 1000.0, "kWh"),
    ("U_EN_MJ", "energy", "MJ", 1.0 / 3.6, "kWh"),
    ("U_EN_HP_HR", "energy", "hp-hr", 0.7457, "kWh"),
    ("U_DIST_KM", "distance", "km", 1.0, "km"),
    ("U_TWORK_TKM", "transport_work", "tkm", 1.0, "tkm"),
    ("U_COUNT_P", "count", "p", 1.0, "p"),
    ("U_COUNT_P_SHEET", "count", "p (sheet)", 1.0, "p (sheet)"),
    ("U_TIME_HR", "time", "hr", 1.0, "hr"),
    ("U_AREA_M2", "area", "m2", 1.0, "m2"),
];

/// (ef_id, scope, group_name, activity_name, description, dimension, base_unit, factor)
const SAMPLE_FACTORS: &[(&str, u8, &str, &str, &str, &str, &str, f64)] = &[
    (
        "EF011",
        2,
        "Electricity",
        "Electricity, grid mix",
        "Purchased electricity grid mix (2016-2018)",
        "energy",
        "kWh",
        0.4999,
    ),
    (
        "EF005",
        1,
        "Stationary Combustion",
        "Gas/Diesel oil combustion",
        "Gas/Diesel oil combustion (stationary source)",
        "volume",
        "L",
        2.7078,
    ),
    (
        "EF012",
        3,
        "Purchased goods",
        "ABS resin",
        "Acrylonitrile Butadiene Styrene at plant",
        "mass",
        "kg",
        4.1597,
    ),
];

pub fn run(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            rollback_sql TEXT
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            1,
            "Seed unit catalog",
            Some("DELETE FROM units WHERE unit_id LIKE 'U\\_%' ESCAPE '\\';"),
        )?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(conn, 2, "Seed sample emission factors", None)?;
    }

    if current_version < 3 {
        info!(target: "app::db", version = current_version, "running migration v3");
        migrate_to_v3(conn)?;
        current_version = 3;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(
            conn,
            3,
            "Add emission factor import ledger",
            Some("DROP TABLE IF EXISTS ef_import_runs;"),
        )?;
    }

    if current_version != USER_VERSION {
        conn.execute(&format!("PRAGMA user_version = {}", USER_VERSION), [])?;
    }

    Ok(())
}

fn record_migration(
    conn: &Connection,
    version: i32,
    description: &str,
    rollback_sql: Option<&str>,
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO migration_history (version, description, applied_at, rollback_sql) VALUES (?, ?, ?, ?)",
        (version, description, now, rollback_sql),
    )?;
    Ok(())
}

pub fn rollback_to_version(conn: &Connection, target_version: i32) -> AppResult<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if target_version >= current_version {
        warn!(
            target: "app::db",
            target_version, current_version, "rollback target is not below current version"
        );
        return Ok(());
    }

    // The history cursor must be closed before DROP TABLE can run.
    let pending: Vec<(i32, Option<String>)> = {
        let mut stmt = conn.prepare(
            "SELECT version, rollback_sql FROM migration_history WHERE version > ? ORDER BY version DESC",
        )?;
        let rows = stmt.query_map([target_version], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, Option<String>>(1)?))
        })?;
        rows.collect::<Result<_, _>>()?
    };

    let tx = conn.unchecked_transaction()?;
    for (version, rollback_sql) in pending {
        if let Some(sql) = rollback_sql {
            info!(target: "app::db", version, "rolling back migration");
            tx.execute_batch(&sql)?;
        } else {
            warn!(target: "app::db", version, "no rollback script available for migration");
        }
    }

    tx.pragma_update(None, "user_version", target_version)?;
    tx.execute("DELETE FROM migration_history WHERE version > ?", [target_version])?;
    tx.commit()?;

    Ok(())
}

pub fn get_migration_history(conn: &Connection) -> AppResult<Vec<MigrationInfo>> {
    let mut stmt = conn
        .prepare("SELECT version, description, applied_at FROM migration_history ORDER BY version")?;

    let migration_iter = stmt.query_map([], |row| {
        let applied_at_str: String = row.get(2)?;
        let applied_at = DateTime::parse_from_rfc3339(&applied_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    2,
                    "applied_at".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Utc);

        Ok(MigrationInfo {
            version: row.get(0)?,
            description: row.get(1)?,
            applied_at,
        })
    })?;

    let mut migrations = Vec::new();
    for migration in migration_iter {
        migrations.push(migration?);
    }
    Ok(migrations)
}

fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    let mut stmt = conn.prepare(
        r#"
        INSERT OR IGNORE INTO units (unit_id, dimension, unit_name, to_base_factor, base_unit)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )?;
    for (unit_id, dimension, unit_name, to_base_factor, base_unit) in SEED_UNITS {
        stmt.execute(params![unit_id, dimension, unit_name, to_base_factor, base_unit])?;
    }
    Ok(())
}

// Only seeds an empty catalog so a database that already holds imported
// factors is left alone.
fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    let existing: i64 =
        conn.query_row("SELECT COUNT(*) FROM emission_factors", [], |row| row.get(0))?;
    if existing > 0 {
        info!(target: "app::db", existing, "emission factor catalog not empty, skipping sample seed");
        return Ok(());
    }

    let mut stmt = conn.prepare(
        r#"
        INSERT INTO emission_factors (
            ef_id, scope, group_name, activity_name, description,
            dimension, base_unit, factor_per_base_unit
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )?;
    for (ef_id, scope, group, name, description, dimension, base_unit, factor) in SAMPLE_FACTORS {
        stmt.execute(params![ef_id, scope, group, name, description, dimension, base_unit, factor])?;
    }
    Ok(())
}

fn migrate_to_v3(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS ef_import_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            source_digest TEXT NOT NULL,
            rows_read INTEGER NOT NULL,
            records_imported INTEGER NOT NULL,
            rows_skipped INTEGER NOT NULL,
            imported_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_ef_import_runs_imported_at
            ON ef_import_runs(imported_at);
        "#,
    )?;
    Ok(())
}
