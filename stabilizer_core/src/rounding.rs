//! Presentation-side numeric helpers: zero clamp and decimal rounding.

/// Trimmed means below this value are displayed as exactly zero.
pub const ZERO_CLAMP_BELOW: f64 = 0.5;

/// Scaled magnitudes at or above 2^52 have no fractional part left in `f64`.
const INTEGRAL_ABOVE: f64 = 4_503_599_627_370_496.0;

/// Largest number of decimal places honoured when rounding; larger requests
/// are clamped so `10^places` stays exact in `f64`.
pub const MAX_DECIMAL_PLACES: u32 = 9;

/// Treat anything below [`ZERO_CLAMP_BELOW`] (including negative drift) as zero.
#[inline]
pub fn clamp_near_zero(x: f64) -> f64 {
    if x < ZERO_CLAMP_BELOW { 0.0 } else { x }
}

/// Round to `places` decimal digits, ties away from zero.
///
/// `f64::round` already rounds half away from zero; scaling first moves the
/// tie onto the integer boundary (`1.25 * 10 == 12.5` exactly, so `1.25 -> 1.3`).
/// Non-finite inputs, and inputs already integral at the requested
/// precision, are returned unchanged.
#[inline]
pub fn round_half_away(x: f64, places: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let scale = 10f64.powi(places.min(MAX_DECIMAL_PLACES) as i32);
    let scaled = x * scale;
    if !scaled.is_finite() || scaled.abs() >= INTEGRAL_ABOVE {
        return x;
    }
    scaled.round() / scale
}
