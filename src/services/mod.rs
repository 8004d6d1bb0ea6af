pub mod activity_service;
pub mod aggregation;
pub mod catalog_service;
pub mod ef_import_service;
pub mod emission_calculator;
pub mod report_service;
pub mod settings_service;
pub mod unit_normalizer;
