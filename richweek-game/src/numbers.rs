//! Numeric helpers: fixed-precision rounding and safe casts.
//!
//! Time and money values are rounded to two decimals immediately after any
//! arithmetic whose result is echoed into persisted state, so multi-week
//! runs never accumulate float drift.

use num_traits::cast::cast;

/// Round to `precision` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(u32_to_i32(precision));
    (value * factor).round() / factor
}

/// Round to the engine's standard two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round to four decimal places (ROI reporting).
#[must_use]
pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}

/// Convert u32 to i32, saturating at the i32 range.
#[must_use]
pub fn u32_to_i32(value: u32) -> i32 {
    cast::<u32, i32>(value).unwrap_or(i32::MAX)
}

/// Convert usize to u32, saturating at the u32 range.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    cast::<usize, u32>(value).unwrap_or(u32::MAX)
}
