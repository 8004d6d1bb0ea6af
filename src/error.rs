use rusqlite;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {message}")]
    Database { message: String },

    #[error("record not found")]
    NotFound,

    #[error("record conflict: {message}")]
    Conflict { message: String },

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        details: Option<JsonValue>,
    },

    #[error("unknown emission factor unit: \"{label}\"")]
    UnknownUnit { label: String },

    #[error("invalid scope list: \"{raw}\" (expected values among 1, 2, 3)")]
    InvalidScope { raw: String },

    #[error("emission factor is not a finite number: \"{raw}\"")]
    NonFiniteFactor { raw: String },

    #[error(
        "unit {unit_id} ({unit_dimension}/{unit_base}) does not match emission factor {ef_id} ({ef_dimension}/{ef_base})"
    )]
    DimensionUnitMismatch {
        ef_id: String,
        ef_dimension: String,
        ef_base: String,
        unit_id: String,
        unit_dimension: String,
        unit_base: String,
    },

    #[error("incomplete row: missing {field}")]
    IncompleteRow { field: &'static str },

    #[error("malformed row: {reason}")]
    MalformedRow { reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            source: None,
            details: None,
        }
    }

    pub fn unknown_unit(label: impl Into<String>) -> Self {
        let label = label.into();
        debug_row_error("unknown unit", &label);
        AppError::UnknownUnit { label }
    }

    pub fn invalid_scope(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        debug_row_error("invalid scope", &raw);
        AppError::InvalidScope { raw }
    }

    pub fn non_finite_factor(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        debug_row_error("non-finite factor", &raw);
        AppError::NonFiniteFactor { raw }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::conflict", %message, "conflict error");
        AppError::Conflict { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::database", "resource not found");
        AppError::NotFound
    }

    pub fn database(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::database", %message, "database error");
        AppError::Database { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    /// Stable machine-readable code, shared by import skip reports and the command layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database { .. } => "DATABASE_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            AppError::InvalidScope { .. } => "INVALID_SCOPE",
            AppError::NonFiniteFactor { .. } => "NON_FINITE_FACTOR",
            AppError::DimensionUnitMismatch { .. } => "DIMENSION_UNIT_MISMATCH",
            AppError::IncompleteRow { .. } => "INCOMPLETE_ROW",
            AppError::MalformedRow { .. } => "MALFORMED_ROW",
            AppError::Serialization(_) | AppError::Yaml(_) => "SERIALIZATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Other(_) => "UNKNOWN",
        }
    }

    /// Row-scoped failures that an import skips instead of aborting the batch.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            AppError::UnknownUnit { .. }
                | AppError::InvalidScope { .. }
                | AppError::NonFiniteFactor { .. }
                | AppError::IncompleteRow { .. }
                | AppError::MalformedRow { .. }
        )
    }
}

// Row errors are expected during imports; the import service logs the skip itself.
fn debug_row_error(kind: &str, raw: &str) {
    tracing::debug!(target: "app::import", kind, raw, "row-level error");
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::Error::{QueryReturnedNoRows, SqliteFailure};
        use rusqlite::ErrorCode;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
                AppError::conflict("unique or check constraint violated")
            }
            _ => {
                error!(target: "app::database", error = ?error, "sqlite error");
                AppError::database(error.to_string())
            }
        }
    }
}
