use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::{info, warn};

use crate::db::repositories::settings_repository::{AppSettingRow, SettingsRepository};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::settings::{ReportSettings, ReportSettingsUpdate};

const KEY_REPORT_TITLE: &str = "report_title";
const KEY_REPORT_DECIMALS: &str = "report_decimals";

pub const DEFAULT_REPORT_TITLE: &str = "CFO Monthly Summary";
pub const DEFAULT_REPORT_DECIMALS: u8 = 2;
pub const MAX_REPORT_DECIMALS: u8 = 6;
const MAX_TITLE_CHARS: usize = 120;

pub struct SettingsService {
    db: DbPool,
    cache: RwLock<Option<ReportSettings>>,
}

impl SettingsService {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            cache: RwLock::new(None),
        }
    }

    pub fn get(&self) -> AppResult<ReportSettings> {
        if let Ok(guard) = self.cache.read() {
            if let Some(settings) = guard.as_ref() {
                return Ok(settings.clone());
            }
        }

        let settings = self.load_settings_from_db()?;
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(settings.clone());
        }
        Ok(settings)
    }

    pub fn update(&self, input: ReportSettingsUpdate) -> AppResult<ReportSettings> {
        let mut current = self.get()?;

        let title = match input.report_title.as_deref().map(single_line_title) {
            Some(title) if title.is_empty() => {
                return Err(AppError::validation("report title cannot be empty"))
            }
            Some(title) if title.chars().count() > MAX_TITLE_CHARS => {
                return Err(AppError::validation(format!(
                    "report title must be at most {MAX_TITLE_CHARS} characters"
                )))
            }
            other => other,
        };

        if let Some(decimals) = input.report_decimals {
            if decimals > MAX_REPORT_DECIMALS {
                return Err(AppError::validation(format!(
                    "report decimals must be between 0 and {MAX_REPORT_DECIMALS}"
                )));
            }
        }

        let now = Utc::now().to_rfc3339();
        self.db.with_connection(|conn| {
            if let Some(title) = title.as_deref() {
                SettingsRepository::upsert(conn, KEY_REPORT_TITLE, title, &now)?;
            }
            if let Some(decimals) = input.report_decimals {
                SettingsRepository::upsert(conn, KEY_REPORT_DECIMALS, &decimals.to_string(), &now)?;
            }
            Ok(())
        })?;

        if let Some(title) = title {
            current.report_title = title;
        }
        if let Some(decimals) = input.report_decimals {
            current.report_decimals = decimals;
        }
        current.updated_at = now;

        info!(
            target: "app::settings",
            title = %current.report_title,
            decimals = current.report_decimals,
            "report settings updated"
        );

        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(current.clone());
        }

        Ok(current)
    }

    fn load_settings_from_db(&self) -> AppResult<ReportSettings> {
        self.db.with_connection(|conn| {
            let rows = SettingsRepository::list(conn)?;
            let mut map: HashMap<String, AppSettingRow> = HashMap::new();
            let mut latest_updated_at: Option<String> = None;

            for row in rows {
                latest_updated_at = match latest_updated_at {
                    Some(ref current) if current >= &row.updated_at => Some(current.clone()),
                    _ => Some(row.updated_at.clone()),
                };
                map.insert(row.key.clone(), row);
            }

            let report_title = map
                .get(KEY_REPORT_TITLE)
                .map(|row| single_line_title(&row.value))
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());

            let report_decimals = match map.get(KEY_REPORT_DECIMALS) {
                Some(row) => match row.value.parse::<u8>() {
                    Ok(value) if value <= MAX_REPORT_DECIMALS => value,
                    _ => {
                        warn!(
                            target: "app::settings",
                            value = %row.value,
                            "stored report decimals invalid, falling back to default"
                        );
                        DEFAULT_REPORT_DECIMALS
                    }
                },
                None => DEFAULT_REPORT_DECIMALS,
            };

            Ok(ReportSettings {
                report_title,
                report_decimals,
                updated_at: latest_updated_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
            })
        })
    }
}

/// The title becomes a Markdown heading, so it must stay on one line.
fn single_line_title(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn setup_service() -> (SettingsService, DbPool, TempDir) {
        let dir = tempdir().expect("temp dir");
        let pool = DbPool::new(dir.path().join("settings.sqlite")).expect("db pool");
        (SettingsService::new(pool.clone()), pool, dir)
    }

    #[test]
    fn defaults_are_returned_when_no_settings_exist() {
        let (service, _pool, _dir) = setup_service();
        let settings = service.get().expect("settings");
        assert_eq!(settings.report_title, DEFAULT_REPORT_TITLE);
        assert_eq!(settings.report_decimals, DEFAULT_REPORT_DECIMALS);
    }

    #[test]
    fn update_persists_across_service_instances() {
        let (service, pool, _dir) = setup_service();
        service
            .update(ReportSettingsUpdate {
                report_title: Some("  FY2024 Emissions ".into()),
                report_decimals: Some(4),
            })
            .expect("update");

        let reloaded = SettingsService::new(pool).get().expect("reload");
        assert_eq!(reloaded.report_title, "FY2024 Emissions");
        assert_eq!(reloaded.report_decimals, 4);
    }

    #[test]
    fn multi_line_titles_are_folded_onto_one_line() {
        let (service, pool, _dir) = setup_service();
        let updated = service
            .update(ReportSettingsUpdate {
                report_title: Some("Site A\n| Month | Total |\r\n\tQ3".into()),
                report_decimals: None,
            })
            .expect("update");
        assert_eq!(updated.report_title, "Site A | Month | Total | Q3");

        assert!(service
            .update(ReportSettingsUpdate {
                report_title: Some("\n\r\n".into()),
                report_decimals: None,
            })
            .is_err());

        // Titles stored before folding was enforced are folded on read.
        pool.with_connection(|conn| {
            SettingsRepository::upsert(conn, KEY_REPORT_TITLE, "Legacy\nTitle", "2024-01-01T00:00:00Z")
        })
        .expect("seed legacy title");
        let reloaded = SettingsService::new(pool).get().expect("reload");
        assert_eq!(reloaded.report_title, "Legacy Title");
    }

    #[test]
    fn invalid_updates_are_rejected_and_leave_state_untouched() {
        let (service, _pool, _dir) = setup_service();
        let err = service
            .update(ReportSettingsUpdate {
                report_title: None,
                report_decimals: Some(MAX_REPORT_DECIMALS + 1),
            })
            .expect_err("too many decimals");
        assert_eq!(err.code(), "VALIDATION_ERROR");

        assert!(service
            .update(ReportSettingsUpdate {
                report_title: Some("   ".into()),
                report_decimals: None,
            })
            .is_err());

        assert_eq!(service.get().expect("settings").report_decimals, DEFAULT_REPORT_DECIMALS);
    }

    #[test]
    fn corrupt_stored_decimals_fall_back_to_default() {
        let (service, pool, _dir) = setup_service();
        pool.with_connection(|conn| {
            SettingsRepository::upsert(conn, KEY_REPORT_DECIMALS, "many", "2024-01-01T00:00:00Z")
        })
        .expect("seed");
        assert_eq!(service.get().expect("settings").report_decimals, DEFAULT_REPORT_DECIMALS);
    }
}
