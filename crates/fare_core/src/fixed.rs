//! Fixed-point conversions.
//!
//! Every value that reaches a tree is an `i64` in micro-units
//! (1 unit = 1e-6). Conversions round to the nearest micro-unit so that the
//! same `f32` input always yields the same integer on every platform.

/// Scaling factor: 1.0 == `SCALE`.
pub const SCALE: i64 = 1_000_000;

/// Convert an `f64` into micro-units, rounding to nearest.
#[inline]
pub fn from_f64(value: f64) -> i64 {
    (value * SCALE as f64).round() as i64
}

/// Convert an `f32` into micro-units, rounding to nearest.
///
/// The value is widened through its shortest decimal form so that `4.3f32`
/// becomes exactly `4_300_000` rather than `4_299_999`.
#[inline]
pub fn from_f32(value: f32) -> i64 {
    let widened: f64 = value.to_string().parse().unwrap_or(value as f64);
    from_f64(widened)
}

/// Convert an integer count into micro-units.
#[inline]
pub fn from_int(value: i64) -> i64 {
    value.saturating_mul(SCALE)
}

/// Convert micro-units back to `f64`.
#[inline]
pub fn to_f64(raw: i64) -> f64 {
    raw as f64 / SCALE as f64
}

/// Convert micro-units back to `f32`.
#[inline]
pub fn to_f32(raw: i64) -> f32 {
    to_f64(raw) as f32
}

/// Multiply two micro-unit values, truncating toward zero.
#[inline]
pub fn mul(a: i64, b: i64) -> i64 {
    let product = a as i128 * b as i128 / SCALE as i128;
    product.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
