use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// GHG Protocol scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum Scope {
    Direct,
    Energy,
    OtherIndirect,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Direct, Scope::Energy, Scope::OtherIndirect];

    pub fn as_u8(self) -> u8 {
        match self {
            Scope::Direct => 1,
            Scope::Energy => 2,
            Scope::OtherIndirect => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Scope::Direct),
            2 => Some(Scope::Energy),
            3 => Some(Scope::OtherIndirect),
            _ => None,
        }
    }

    /// Coarse category label stored on imported factors.
    pub fn group_label(self) -> &'static str {
        match self {
            Scope::Direct => "Direct / Fuel Combustion",
            Scope::Energy => "Electricity",
            Scope::OtherIndirect => "Other indirect (Scope 3)",
        }
    }
}

impl TryFrom<u8> for Scope {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Scope::from_u8(value).ok_or_else(|| format!("scope must be 1, 2 or 3 (got {value})"))
    }
}

impl From<Scope> for u8 {
    fn from(scope: Scope) -> Self {
        scope.as_u8()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Volume,
    Energy,
    Distance,
    TransportWork,
    Count,
    Time,
    Area,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Mass => "mass",
            Dimension::Volume => "volume",
            Dimension::Energy => "energy",
            Dimension::Distance => "distance",
            Dimension::TransportWork => "transport_work",
            Dimension::Count => "count",
            Dimension::Time => "time",
            Dimension::Area => "area",
        }
    }
}

impl FromStr for Dimension {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mass" => Ok(Dimension::Mass),
            "volume" => Ok(Dimension::Volume),
            "energy" => Ok(Dimension::Energy),
            "distance" => Ok(Dimension::Distance),
            "transport_work" => Ok(Dimension::TransportWork),
            "count" => Ok(Dimension::Count),
            "time" => Ok(Dimension::Time),
            "area" => Ok(Dimension::Area),
            other => Err(AppError::database(format!("unknown dimension in store: {other}"))),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical unit of a dimension. Volume and count each carry two
/// non-interchangeable base units, so compatibility is judged on the
/// (dimension, base unit) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BaseUnit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "L")]
    Litre,
    #[serde(rename = "scf")]
    StandardCubicFoot,
    #[serde(rename = "kWh")]
    KilowattHour,
    #[serde(rename = "km")]
    Kilometre,
    #[serde(rename = "tkm")]
    TonneKilometre,
    #[serde(rename = "p")]
    Piece,
    #[serde(rename = "p (sheet)")]
    Sheet,
    #[serde(rename = "hr")]
    Hour,
    #[serde(rename = "m2")]
    SquareMetre,
}

impl BaseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseUnit::Kilogram => "kg",
            BaseUnit::Litre => "L",
            BaseUnit::StandardCubicFoot => "scf",
            BaseUnit::KilowattHour => "kWh",
            BaseUnit::Kilometre => "km",
            BaseUnit::TonneKilometre => "tkm",
            BaseUnit::Piece => "p",
            BaseUnit::Sheet => "p (sheet)",
            BaseUnit::Hour => "hr",
            BaseUnit::SquareMetre => "m2",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            BaseUnit::Kilogram => Dimension::Mass,
            BaseUnit::Litre | BaseUnit::StandardCubicFoot => Dimension::Volume,
            BaseUnit::KilowattHour => Dimension::Energy,
            BaseUnit::Kilometre => Dimension::Distance,
            BaseUnit::TonneKilometre => Dimension::TransportWork,
            BaseUnit::Piece | BaseUnit::Sheet => Dimension::Count,
            BaseUnit::Hour => Dimension::Time,
            BaseUnit::SquareMetre => Dimension::Area,
        }
    }
}

impl FromStr for BaseUnit {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "kg" => Ok(BaseUnit::Kilogram),
            "L" => Ok(BaseUnit::Litre),
            "scf" => Ok(BaseUnit::StandardCubicFoot),
            "kWh" => Ok(BaseUnit::KilowattHour),
            "km" => Ok(BaseUnit::Kilometre),
            "tkm" => Ok(BaseUnit::TonneKilometre),
            "p" => Ok(BaseUnit::Piece),
            "p (sheet)" => Ok(BaseUnit::Sheet),
            "hr" => Ok(BaseUnit::Hour),
            "m2" => Ok(BaseUnit::SquareMetre),
            other => Err(AppError::database(format!("unknown base unit in store: {other}"))),
        }
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactorRecord {
    pub ef_id: String,
    pub scope: Scope,
    pub group_name: String,
    pub activity_name: String,
    pub description: String,
    pub dimension: Dimension,
    pub base_unit: BaseUnit,
    /// kgCO2e per one `base_unit`.
    pub factor_per_base_unit: f64,
}

/// One row of an emission factor source sheet, exported as JSON or YAML.
///
/// Column names follow the spreadsheet headers; the original Thai headers are
/// accepted as aliases. Any cell may arrive as a number or as text.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EfSourceRow {
    #[serde(default, alias = "ชื่อ", alias = "Name")]
    pub name: Option<JsonValue>,
    #[serde(default, alias = "หน่วย", alias = "Unit")]
    pub unit: Option<JsonValue>,
    #[serde(default, rename = "Emission Factors", alias = "emission_factor")]
    pub emission_factor: Option<JsonValue>,
    #[serde(default, rename = "Scope", alias = "scope")]
    pub scope: Option<JsonValue>,
    #[serde(default, rename = "Description", alias = "คำอธิบาย", alias = "description")]
    pub description: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    /// 1-based position in the source.
    pub row: usize,
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub source: String,
    pub source_digest: String,
    pub rows_read: usize,
    pub records_imported: usize,
    pub skipped: Vec<SkippedRow>,
    pub imported_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportRunRecord {
    pub id: i64,
    pub source: String,
    pub source_digest: String,
    pub rows_read: i64,
    pub records_imported: i64,
    pub rows_skipped: i64,
    pub imported_at: String,
}
