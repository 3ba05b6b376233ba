use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use std::str::FromStr;

/// Rounds `value` to `dp` decimal places, half away from zero.
///
/// Ties are judged on the shortest decimal form of the float (`1.005`
/// rounds to `1.01`), not on its binary expansion.
pub fn round_to(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .and_then(|d| {
            d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or_else(|| {
            // Past Decimal's range no fractional digits survive anyway.
            if value.abs() >= 1e15 {
                return value;
            }
            let scale = 10f64.powi(dp as i32);
            (value * scale).round() / scale
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(2.345, 2), 2.35);
        assert_eq!(round_to(-2.345, 2), -2.35);
        assert_eq!(round_to(1.005, 2), 1.01);
        assert_eq!(round_to(2.344, 2), 2.34);
        assert_eq!(round_to(37.123456, 4), 37.1235);
    }

    #[test]
    fn test_round_passes_through_extremes() {
        assert_eq!(round_to(1e30, 2), 1e30);
        assert!(round_to(f64::NAN, 2).is_nan());
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
        assert_eq!(round_to(0.0, 2), 0.0);
        assert_eq!(round_to(1e-30, 2), 0.0);
    }
}
