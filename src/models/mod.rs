pub mod activity;
pub mod emission_factor;
pub mod settings;
pub mod summary;
pub mod unit;
