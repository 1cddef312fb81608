//! Null-propagating arithmetic used by pickup and pacing calculations
//!
//! Contains:
//! - Presence filtering (non-finite values count as missing)
//! - Pickup between an early snapshot and a final value
//! - Percentage change against a baseline, with a guarded divisor
//! - Band ordering checks for forecast intervals

use num_traits::Float;

/// Treat NaN and infinities as missing data
pub fn present<T: Float>(value: Option<T>) -> Option<T> {
    value.filter(|v| v.is_finite())
}

/// Sum of two optional operands, `None` when either is missing
pub fn add<T: Float>(a: Option<T>, b: Option<T>) -> Option<T> {
    Some(present(a)? + present(b)?)
}

/// Bookings gained between `early` and `final_value`
///
/// Returns `None` unless both anchors are present.
pub fn pickup<T: Float>(final_value: Option<T>, early: Option<T>) -> Option<T> {
    Some(present(final_value)? - present(early)?)
}

/// Division that refuses a zero or missing denominator
pub fn safe_div<T: Float>(numerator: Option<T>, denominator: Option<T>) -> Option<T> {
    let denominator = present(denominator)?;
    if denominator == T::zero() {
        return None;
    }
    present(Some(present(numerator)? / denominator))
}

/// Percentage change of `current` relative to `baseline`
///
/// A zero baseline yields `None`, never an infinite percentage.
pub fn percent_change<T: Float>(current: Option<T>, baseline: Option<T>) -> Option<T> {
    let current = present(current)?;
    let baseline = present(baseline)?;
    let hundred = <T as num_traits::NumCast>::from(100.0)?;
    safe_div(Some(current - baseline), Some(baseline)).map(|ratio| ratio * hundred)
}

/// Whether `lower <= point <= upper` holds
///
/// Missing members are skipped; the ones that are present must still be in order.
pub fn is_ordered_band<T: Float>(lower: Option<T>, point: Option<T>, upper: Option<T>) -> bool {
    match (present(lower), present(point), present(upper)) {
        (Some(l), Some(p), Some(u)) => l <= p && p <= u,
        (Some(l), None, Some(u)) => l <= u,
        (Some(l), Some(p), None) => l <= p,
        (None, Some(p), Some(u)) => p <= u,
        _ => true,
    }
}
