//! Numeric value generators.

use fixture_core::{ScalarType, Value};
use rand::Rng;

/// Magnitude bound of default floats and decimals.
pub const DEFAULT_FLOAT_BOUND: f64 = 1_000_000.0;

/// Generate an integer of `scalar` in `[min, max]`, clamped to the type's
/// own bounds.
///
/// Returns `None` when `scalar` is not an integer type or the clamped range
/// is empty.
pub fn generate_int_range<R: Rng>(
    rng: &mut R,
    scalar: ScalarType,
    min: i128,
    max: i128,
) -> Option<Value> {
    let (lower, upper) = scalar.integer_bounds()?;
    let min = min.max(lower);
    let max = max.min(upper);
    if min > max {
        return None;
    }

    let value = rng.gen_range(min..=max);
    // Clamped to the scalar's bounds, so the narrowing casts are exact
    Some(if scalar.is_unsigned() {
        Value::UInt(value as u64)
    } else {
        Value::Int(value as i64)
    })
}

/// Generate an integer anywhere in the range of `scalar`.
pub fn generate_integer<R: Rng>(rng: &mut R, scalar: ScalarType) -> Option<Value> {
    let (min, max) = scalar.integer_bounds()?;
    generate_int_range(rng, scalar, min, max)
}

/// Widest span handed to `gen_range` in one draw.
const SAFE_FLOAT_SPAN: f64 = f64::MAX / 4.0;

/// Draw a float in `[min, max]`.
///
/// Both bounds must be finite. Spans too wide for a single uniform draw are
/// halved at the midpoint, one half picked at random, until they fit.
pub fn sample_f64<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    let (mut lo, mut hi) = (min, max);
    while hi - lo > SAFE_FLOAT_SPAN {
        let mid = lo / 2.0 + hi / 2.0;
        if rng.gen_bool(0.5) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    rng.gen_range(lo..=hi)
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> Value {
    Value::Float(sample_f64(rng, min, max))
}

/// Generate a float representable as an `f32`.
///
/// Bounds are clamped to the finite `f32` range.
pub fn generate_f32_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> Value {
    let limit = f64::from(f32::MAX);
    let min = f64::from(min.clamp(-limit, limit) as f32);
    let max = f64::from(max.clamp(-limit, limit) as f32);
    // Both bounds are f32 values, so rounding the draw stays inside them
    let value = sample_f64(rng, min, max) as f32;
    Value::Float(f64::from(value))
}

/// Generate a random decimal in the given range.
///
/// The decimal is stored as a string with 2 decimal places.
pub fn generate_decimal_range<R: Rng>(rng: &mut R, min: f64, max: f64) -> Value {
    let value = sample_f64(rng, min, max);
    Value::Decimal(format!("{value:.2}"))
}
