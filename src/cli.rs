use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::commands::activity::{self, ActivityCreatePayload};
use crate::commands::settings::{self, SettingsUpdatePayload};
use crate::commands::{catalog, import, summary, AppState, CommandError, CommandResult};
use crate::error::AppError;
use crate::models::summary::ReportExportFormat;

#[derive(Debug, Parser)]
#[command(
    name = "cfo-tracker",
    version,
    about = "Carbon footprint tracker: emission factor catalog, activity log and scope summaries"
)]
pub struct Cli {
    /// Data directory holding cfo.sqlite, logs/ and reports/ (or set CFO_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replace the scope 1-3 emission factor catalog from a JSON or YAML sheet export
    Import(ImportArgs),
    /// Show recent emission factor imports
    Imports {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List emission factors
    Efs {
        /// Only factors of this scope (1, 2 or 3)
        #[arg(long)]
        scope: Option<u8>,
    },
    /// List units, optionally only those compatible with an emission factor
    Units {
        #[arg(long, value_name = "EF_ID")]
        ef: Option<String>,
    },
    /// Record, list or delete activities
    #[command(subcommand)]
    Activity(ActivityCommand),
    /// Totals per scope
    Summary,
    /// tCO2e per scope and month
    Monthly,
    /// Full summary report (title, scope totals, monthly rollup)
    Report,
    /// Write the summary report to the reports directory
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormatArg::Markdown)]
        format: ExportFormatArg,
    },
    /// Read or change report settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Source file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    #[arg(value_name = "PATH")]
    pub source: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum ActivityCommand {
    Add(ActivityAddArgs),
    List,
    Get { activity_id: String },
    Delete { activity_id: String },
}

#[derive(Debug, Args)]
pub struct ActivityAddArgs {
    #[arg(long)]
    pub description: String,
    /// Activity date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub ef: String,
    #[arg(long)]
    pub unit: String,
    #[arg(long)]
    pub amount: f64,
    /// Must match the emission factor's scope when given
    #[arg(long)]
    pub scope: Option<u8>,
    #[arg(long)]
    pub remark: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Get,
    Set {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        decimals: Option<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Markdown,
    Json,
}

impl From<ExportFormatArg> for ReportExportFormat {
    fn from(value: ExportFormatArg) -> Self {
        match value {
            ExportFormatArg::Markdown => ReportExportFormat::Markdown,
            ExportFormatArg::Json => ReportExportFormat::Json,
        }
    }
}

/// Runs one subcommand and returns its result as JSON for printing.
pub fn execute(command: Commands, state: &AppState) -> CommandResult<JsonValue> {
    match command {
        Commands::Import(args) => to_json(import::ef_import(state, &args.source)?),
        Commands::Imports { limit } => to_json(import::ef_import_runs(state, limit)?),
        Commands::Efs { scope } => to_json(catalog::ef_list(state, scope)?),
        Commands::Units { ef } => to_json(catalog::units_list(state, ef.as_deref())?),
        Commands::Activity(ActivityCommand::Add(args)) => {
            let payload = ActivityCreatePayload {
                description: args.description,
                date: args.date,
                scope: args.scope,
                ef_id: args.ef,
                unit_id: args.unit,
                amount: args.amount,
                remark: args.remark,
            };
            to_json(activity::activity_create(state, payload)?)
        }
        Commands::Activity(ActivityCommand::List) => to_json(activity::activity_list(state)?),
        Commands::Activity(ActivityCommand::Get { activity_id }) => {
            to_json(activity::activity_get(state, &activity_id)?)
        }
        Commands::Activity(ActivityCommand::Delete { activity_id }) => {
            activity::activity_delete(state, &activity_id)?;
            to_json(serde_json::json!({ "activityId": activity_id, "deleted": true }))
        }
        Commands::Summary => to_json(summary::summary_by_scope(state)?),
        Commands::Monthly => to_json(summary::summary_monthly(state)?),
        Commands::Report => to_json(summary::summary_report(state)?),
        Commands::Export { format } => to_json(summary::report_export(state, format.into())?),
        Commands::Settings(SettingsCommand::Get) => to_json(settings::settings_get(state)?),
        Commands::Settings(SettingsCommand::Set { title, decimals }) => {
            let payload = SettingsUpdatePayload {
                report_title: title,
                report_decimals: decimals,
            };
            to_json(settings::settings_update(state, payload)?)
        }
    }
}

fn to_json<T: Serialize>(value: T) -> CommandResult<JsonValue> {
    serde_json::to_value(value).map_err(|err| CommandError::from(AppError::from(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_activity_add_with_global_data_dir() {
        let cli = Cli::try_parse_from([
            "cfo-tracker",
            "activity",
            "add",
            "--description",
            "Boiler",
            "--date",
            "2024-04-01",
            "--ef",
            "EF005",
            "--unit",
            "U_VOL_LITRE",
            "--amount",
            "12.5",
            "--data-dir",
            "/tmp/cfo",
        ])
        .expect("parse");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/cfo")));
        match cli.command {
            Commands::Activity(ActivityCommand::Add(args)) => {
                assert_eq!(args.amount, 12.5);
                assert_eq!(args.scope, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_defaults_to_markdown() {
        let cli = Cli::try_parse_from(["cfo-tracker", "export"]).expect("parse");
        match cli.command {
            Commands::Export { format } => assert_eq!(format, ExportFormatArg::Markdown),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
