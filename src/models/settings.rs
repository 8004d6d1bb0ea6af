use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    pub report_title: String,
    /// Decimal places used when rendering tCO2e in Markdown reports.
    pub report_decimals: u8,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettingsUpdate {
    #[serde(default)]
    pub report_title: Option<String>,
    #[serde(default)]
    pub report_decimals: Option<u8>,
}
