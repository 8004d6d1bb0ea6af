use serde::{Deserialize, Serialize};

use crate::models::emission_factor::Scope;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Active,
    Deleted,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Active => "active",
            ActivityStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ActivityStatus::Active),
            "deleted" => Some(ActivityStatus::Deleted),
            _ => None,
        }
    }
}

/// Emission mass of one activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmissionAmount {
    pub kgco2e: f64,
    pub tco2e: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub activity_id: String,
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub scope: Scope,
    pub ef_id: String,
    pub unit_id: String,
    pub amount: f64,
    pub remark: Option<String>,
    pub emission: EmissionAmount,
    pub status: ActivityStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl ActivityRecord {
    pub fn is_active(&self) -> bool {
        self.status == ActivityStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCreateInput {
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub scope: Option<Scope>,
    pub ef_id: String,
    pub unit_id: String,
    pub amount: f64,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Activity joined with the catalog names it references, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: ActivityRecord,
    pub ef_activity_name: Option<String>,
    pub unit_name: Option<String>,
}
