//! Maps the unit labels found in emission factor source sheets onto a
//! canonical base unit per dimension and rescales the factor to match.

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::emission_factor::{BaseUnit, Dimension};

/// How a factor expressed per source unit becomes a factor per base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rescale {
    Identity,
    /// One base unit equals `k` source units.
    Divide(f64),
    /// One source unit equals `k` base units.
    Multiply(f64),
}

impl Rescale {
    pub fn apply(self, factor_per_source: f64) -> f64 {
        match self {
            Rescale::Identity => factor_per_source,
            Rescale::Divide(k) => factor_per_source / k,
            Rescale::Multiply(k) => factor_per_source * k,
        }
    }

    /// Recovers the per-source factor from a per-base factor.
    pub fn invert(self, factor_per_base: f64) -> f64 {
        match self {
            Rescale::Identity => factor_per_base,
            Rescale::Divide(k) => factor_per_base * k,
            Rescale::Multiply(k) => factor_per_base / k,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRule {
    pub base_unit: BaseUnit,
    pub rescale: Rescale,
}

impl UnitRule {
    pub fn dimension(&self) -> Dimension {
        self.base_unit.dimension()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFactor {
    pub dimension: Dimension,
    pub base_unit: BaseUnit,
    pub factor_per_base: f64,
}

const fn rule(base_unit: BaseUnit, rescale: Rescale) -> UnitRule {
    UnitRule { base_unit, rescale }
}

/// Recognized source labels, lowercase.
const UNIT_TABLE: &[(&str, UnitRule)] = &[
    ("kg", rule(BaseUnit::Kilogram, Rescale::Identity)),
    ("kg.", rule(BaseUnit::Kilogram, Rescale::Identity)),
    ("l", rule(BaseUnit::Litre, Rescale::Identity)),
    ("litre", rule(BaseUnit::Litre, Rescale::Identity)),
    ("liter", rule(BaseUnit::Litre, Rescale::Identity)),
    ("m3", rule(BaseUnit::Litre, Rescale::Divide(1000.0))),
    // Gas volumes stay in scf; no conversion to litres is attempted.
    ("scf", rule(BaseUnit::StandardCubicFoot, Rescale::Identity)),
    ("kwh", rule(BaseUnit::KilowattHour, Rescale::Identity)),
    ("mwh", rule(BaseUnit::KilowattHour, Rescale::Divide(1000.0))),
    ("mj", rule(BaseUnit::KilowattHour, Rescale::Multiply(3.6))),
    ("hp-hr", rule(BaseUnit::KilowattHour, Rescale::Divide(0.7457))),
    ("km", rule(BaseUnit::Kilometre, Rescale::Identity)),
    ("tkm", rule(BaseUnit::TonneKilometre, Rescale::Identity)),
    ("p", rule(BaseUnit::Piece, Rescale::Identity)),
    ("p (sheet)", rule(BaseUnit::Sheet, Rescale::Identity)),
    ("p(sheet)", rule(BaseUnit::Sheet, Rescale::Identity)),
    ("p (แผ่น)", rule(BaseUnit::Sheet, Rescale::Identity)),
    ("p(แผ่น)", rule(BaseUnit::Sheet, Rescale::Identity)),
    ("hr", rule(BaseUnit::Hour, Rescale::Identity)),
    ("hour", rule(BaseUnit::Hour, Rescale::Identity)),
    ("h", rule(BaseUnit::Hour, Rescale::Identity)),
    ("m2", rule(BaseUnit::SquareMetre, Rescale::Identity)),
];

pub fn lookup_rule(raw_label: &str) -> Option<UnitRule> {
    let label = raw_label.trim().to_lowercase();
    UNIT_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == label)
        .map(|(_, rule)| *rule)
}

pub fn recognized_labels() -> impl Iterator<Item = &'static str> {
    UNIT_TABLE.iter().map(|(label, _)| *label)
}

/// Normalizes a raw (unit label, factor) pair from a source sheet.
pub fn normalize(raw_label: &str, raw_factor: f64) -> AppResult<NormalizedFactor> {
    if !raw_factor.is_finite() {
        return Err(AppError::non_finite_factor(raw_factor.to_string()));
    }

    let rule = lookup_rule(raw_label).ok_or_else(|| AppError::unknown_unit(raw_label))?;

    Ok(NormalizedFactor {
        dimension: rule.dimension(),
        base_unit: rule.base_unit,
        factor_per_base: rule.rescale.apply(raw_factor),
    })
}
