use serde::Deserialize;
use tracing::debug;

use crate::error::AppResult;
use crate::models::activity::{ActivityCreateInput, ActivityRecord, ActivityView};

use super::catalog::parse_scope;
use super::{run_command, AppState, CommandResult};

pub fn activity_create(
    state: &AppState,
    payload: ActivityCreatePayload,
) -> CommandResult<ActivityRecord> {
    debug!(target: "app::command", ef_id = %payload.ef_id, "activity_create");
    run_command(|| {
        let input = payload.into_input()?;
        state.activities().create_activity(input)
    })
}

pub fn activity_list(state: &AppState) -> CommandResult<Vec<ActivityView>> {
    run_command(|| state.activities().list_activities())
}

pub fn activity_get(state: &AppState, activity_id: &str) -> CommandResult<ActivityView> {
    run_command(|| state.activities().get_activity(activity_id.trim()))
}

pub fn activity_delete(state: &AppState, activity_id: &str) -> CommandResult<()> {
    debug!(target: "app::command", activity_id, "activity_delete");
    run_command(|| state.activities().delete_activity(activity_id.trim()))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCreatePayload {
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub scope: Option<u8>,
    pub ef_id: String,
    pub unit_id: String,
    pub amount: f64,
    #[serde(default)]
    pub remark: Option<String>,
}

impl ActivityCreatePayload {
    fn into_input(self) -> AppResult<ActivityCreateInput> {
        Ok(ActivityCreateInput {
            description: self.description,
            date: self.date,
            scope: self.scope.map(parse_scope).transpose()?,
            ef_id: self.ef_id,
            unit_id: self.unit_id,
            amount: self.amount,
            remark: self.remark,
        })
    }
}
