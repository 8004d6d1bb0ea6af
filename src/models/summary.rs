use serde::{Deserialize, Serialize};

use crate::models::emission_factor::Scope;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeTotal {
    pub scope: Scope,
    pub total_kgco2e: f64,
    pub total_tco2e: f64,
}

/// Totals for every scope; scopes without activities report zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub scopes: Vec<ScopeTotal>,
    pub total_kgco2e: f64,
    pub total_tco2e: f64,
}

impl ScopeSummary {
    pub fn tco2e_for(&self, scope: Scope) -> f64 {
        self.scopes
            .iter()
            .find(|entry| entry.scope == scope)
            .map(|entry| entry.total_tco2e)
            .unwrap_or(0.0)
    }
}

/// tCO2e per scope for one `YYYY-MM` month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryRow {
    pub month: String,
    pub scope1: f64,
    pub scope2: f64,
    pub scope3: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub title: String,
    pub generated_at: String,
    pub scopes: ScopeSummary,
    pub monthly: Vec<MonthlySummaryRow>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportExportFormat {
    #[default]
    Markdown,
    Json,
}

impl ReportExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ReportExportFormat::Markdown => "md",
            ReportExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportExportResult {
    pub file_path: String,
    pub format: ReportExportFormat,
    pub generated_at: String,
    pub months: usize,
}
