pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::commands::CommandError;
use crate::config::AppConfig;

pub fn run() -> ExitCode {
    match try_run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match serde_json::to_string_pretty(&error) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{error}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn try_run() -> Result<(), CommandError> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.data_dir.as_deref());

    crate::utils::logger::init_logging(&config.log_dir, &config.log_directives)?;
    tracing::debug!(target: "app::command", ?config, "configuration resolved");

    let pool = crate::db::DbPool::new(config.db_path.clone())?;
    let state = crate::commands::AppState::new(pool, config.reports_dir.clone())?;

    let output = crate::cli::execute(cli.command, &state)?;
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|err| CommandError::from(crate::error::AppError::from(err)))?;
    println!("{rendered}");
    Ok(())
}
