/// Proton-count / pH conversion for the beaker titration model
/// The curve is a single straight line through (0 protons, pH 14) and (64 protons, pH 0)

/// Upper bound of the proton slider, and the count at which pH reaches 0
pub const MAX_PROTONS: i64 = 64;

/// Conjugate-base particles placed in the beaker at setup. Fixed for the session.
pub const NUM_CONJUGATE_BASES: u32 = 10;

/// Protons requested at setup, and the value the slider starts at
pub const INITIAL_PROTONS: i64 = 10;

const PH_SLOPE: f64 = -7.0 / 32.0;

/// Convert a proton count to pH
/// pH = -7 (p - 64) / 32, written as 7 (64 - p) / 32 so that p = 64 gives +0.0
pub fn protons_to_ph(num_protons: i64) -> f64 {
    7.0 * (MAX_PROTONS as f64 - num_protons as f64) / 32.0
}

/// Inverse of `protons_to_ph`, truncated toward zero.
///
/// Truncation (not rounding) means a pH displayed with two decimals can map
/// back to one proton fewer than the count it was computed from.
pub fn ph_to_protons(ph: f64) -> i64 {
    (ph / PH_SLOPE + MAX_PROTONS as f64).trunc() as i64
}

/// Round a pH value to the two decimals shown in the pH field
pub fn round_ph(ph: f64) -> f64 {
    (ph * 100.0).round() / 100.0
}

/// Text shown in the pH field for a given proton count
pub fn format_ph(num_protons: i64) -> String {
    format!("{:.2}", round_ph(protons_to_ph(num_protons)))
}
