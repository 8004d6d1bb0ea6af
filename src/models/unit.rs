use serde::{Deserialize, Serialize};

use crate::models::emission_factor::{BaseUnit, Dimension, EmissionFactorRecord};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefinition {
    pub unit_id: String,
    pub dimension: Dimension,
    pub unit_name: String,
    /// Multiply an amount in this unit by this factor to express it in `base_unit`.
    pub to_base_factor: f64,
    pub base_unit: BaseUnit,
}

impl UnitDefinition {
    pub fn is_compatible_with(&self, ef: &EmissionFactorRecord) -> bool {
        self.dimension == ef.dimension && self.base_unit == ef.base_unit
    }
}
