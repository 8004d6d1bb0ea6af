pub mod activity;
pub mod catalog;
pub mod import;
pub mod settings;
pub mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tracing::{error, warn};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::activity_service::ActivityService;
use crate::services::catalog_service::CatalogService;
use crate::services::ef_import_service::EfImportService;
use crate::services::report_service::ReportService;
use crate::services::settings_service::SettingsService;

#[derive(Clone)]
pub struct AppState {
    catalog_service: Arc<CatalogService>,
    import_service: Arc<EfImportService>,
    activity_service: Arc<ActivityService>,
    settings_service: Arc<SettingsService>,
    report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(db_pool: DbPool, reports_dir: PathBuf) -> AppResult<Self> {
        let catalog_service = Arc::new(CatalogService::new(db_pool.clone()));
        let import_service = Arc::new(EfImportService::new(db_pool.clone()));
        let activity_service = Arc::new(ActivityService::new(db_pool.clone()));
        let settings_service = Arc::new(SettingsService::new(db_pool.clone()));
        let report_service = Arc::new(ReportService::new(
            Arc::clone(&activity_service),
            Arc::clone(&settings_service),
            reports_dir,
        )?);

        Ok(Self {
            catalog_service,
            import_service,
            activity_service,
            settings_service,
            report_service,
        })
    }

    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog_service)
    }

    pub fn importer(&self) -> Arc<EfImportService> {
        Arc::clone(&self.import_service)
    }

    pub fn activities(&self) -> Arc<ActivityService> {
        Arc::clone(&self.activity_service)
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.report_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let code = error.code();
        match error {
            AppError::Validation {
                message, details, ..
            } => CommandError::new(code, message, details),
            AppError::NotFound => CommandError::new(code, "requested record does not exist", None),
            AppError::Conflict { message } => CommandError::new(code, message, None),
            AppError::UnknownUnit { ref label } => {
                let details = json!({ "label": label });
                CommandError::new(code, error.to_string(), Some(details))
            }
            AppError::InvalidScope { ref raw } | AppError::NonFiniteFactor { ref raw } => {
                let details = json!({ "raw": raw });
                CommandError::new(code, error.to_string(), Some(details))
            }
            AppError::IncompleteRow { field } => {
                CommandError::new(code, error.to_string(), Some(json!({ "field": field })))
            }
            AppError::MalformedRow { .. } => CommandError::new(code, error.to_string(), None),
            AppError::DimensionUnitMismatch {
                ref ef_id,
                ref ef_dimension,
                ref ef_base,
                ref unit_id,
                ref unit_dimension,
                ref unit_base,
            } => {
                warn!(target: "app::command", %ef_id, %unit_id, "dimension/unit mismatch in command");
                let details = json!({
                    "efId": ef_id,
                    "efDimension": ef_dimension,
                    "efBaseUnit": ef_base,
                    "unitId": unit_id,
                    "unitDimension": unit_dimension,
                    "unitBaseUnit": unit_base,
                });
                CommandError::new(code, error.to_string(), Some(details))
            }
            AppError::Database { message } => {
                error!(target: "app::command", %message, "database error in command");
                CommandError::new(code, message, None)
            }
            AppError::Serialization(err) => {
                error!(target: "app::command", error = %err, "serialization error in command");
                CommandError::new(code, format!("could not parse or encode JSON: {err}"), None)
            }
            AppError::Yaml(err) => {
                error!(target: "app::command", error = %err, "yaml error in command");
                CommandError::new(code, format!("could not parse YAML: {err}"), None)
            }
            AppError::Io(err) => {
                error!(target: "app::command", error = %err, "io error in command");
                CommandError::new(code, format!("file system error: {err}"), None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new(code, message, None)
            }
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

pub(crate) fn run_command<T>(task: impl FnOnce() -> AppResult<T>) -> CommandResult<T> {
    task().map_err(CommandError::from)
}
