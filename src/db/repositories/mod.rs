pub mod activity_repository;
pub mod emission_factor_repository;
pub mod import_run_repository;
pub mod settings_repository;
pub mod unit_repository;
