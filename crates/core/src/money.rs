/// Largest difference, in currency units, still treated as "equal".
pub const EPSILON: f64 = 0.01;

/// Equality within [`EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Round to the currency's minor unit (two decimals).
pub fn round_minor(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `weight × price_per_unit + admin + packaging + transit`, rounded to the
/// minor unit.
pub fn compute_total(
    weight: f64,
    price_per_unit: f64,
    admin_fee: f64,
    packaging_fee: f64,
    transit_fee: f64,
) -> f64 {
    round_minor(weight * price_per_unit + admin_fee + packaging_fee + transit_fee)
}
