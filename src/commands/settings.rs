use serde::Deserialize;

use crate::models::settings::{ReportSettings, ReportSettingsUpdate};

use super::{run_command, AppState, CommandResult};

pub fn settings_get(state: &AppState) -> CommandResult<ReportSettings> {
    run_command(|| state.settings().get())
}

pub fn settings_update(
    state: &AppState,
    payload: SettingsUpdatePayload,
) -> CommandResult<ReportSettings> {
    let input = payload.into_input();
    run_command(|| state.settings().update(input))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdatePayload {
    #[serde(default)]
    pub report_title: Option<String>,
    #[serde(default)]
    pub report_decimals: Option<u8>,
}

impl SettingsUpdatePayload {
    fn into_input(self) -> ReportSettingsUpdate {
        ReportSettingsUpdate {
            report_title: self.report_title,
            report_decimals: self.report_decimals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_changes_nothing() {
        let input = SettingsUpdatePayload::default().into_input();
        assert_eq!(input, ReportSettingsUpdate::default());
    }

    #[test]
    fn payload_reads_camel_case_keys() {
        let payload: SettingsUpdatePayload =
            serde_json::from_str(r#"{"reportTitle": "Q1", "reportDecimals": 3}"#).expect("payload");
        let input = payload.into_input();
        assert_eq!(input.report_title.as_deref(), Some("Q1"));
        assert_eq!(input.report_decimals, Some(3));
    }
}
