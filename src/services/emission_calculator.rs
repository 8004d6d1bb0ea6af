use crate::models::activity::EmissionAmount;

pub const KG_PER_TONNE: f64 = 1000.0;

/// Emission of `amount` units, given the unit's to-base factor and the
/// emission factor per base unit. No rounding; inputs are validated upstream.
pub fn compute_emission(amount: f64, unit_to_base_factor: f64, ef_per_base_unit: f64) -> EmissionAmount {
    let kgco2e = amount * unit_to_base_factor * ef_per_base_unit;
    EmissionAmount {
        kgco2e,
        tco2e: kgco2e / KG_PER_TONNE,
    }
}
