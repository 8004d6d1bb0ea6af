use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "CFO_DATA_DIR";
pub const LOG_ENV: &str = "CFO_LOG";

const DEFAULT_DATA_DIR: &str = "cfo-data";
const DATABASE_FILE: &str = "cfo.sqlite";
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,app::import=debug";

/// Filesystem layout and logging setup for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub log_directives: String,
}

impl AppConfig {
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DATABASE_FILE),
            log_dir: data_dir.join("logs"),
            reports_dir: data_dir.join("reports"),
            log_directives: DEFAULT_LOG_DIRECTIVES.to_string(),
            data_dir,
        }
    }

    /// Flag wins over `CFO_DATA_DIR`, which wins over `./cfo-data`.
    pub fn resolve(data_dir_flag: Option<&Path>) -> Self {
        Self::resolve_with(data_dir_flag, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        data_dir_flag: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let data_dir = data_dir_flag
            .map(Path::to_path_buf)
            .or_else(|| non_empty(env(DATA_DIR_ENV)).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let mut config = Self::for_data_dir(data_dir);
        if let Some(directives) = non_empty(env(LOG_ENV)) {
            config.log_directives = directives;
        }
        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
