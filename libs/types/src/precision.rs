//! Fixed decimal policy for derived metrics
//!
//! Every value the system rounds (dividend yields, P/E ratios, weighted
//! prices, the all-share index) is reduced through this module, so the same
//! scale and rounding mode apply everywhere. The scale and mode could move to
//! configuration if a venue ever needs different conventions; for now they
//! are fixed constants.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::errors::{MarketError, MarketResult};

/// Decimal places kept by every rounded metric.
pub const METRIC_SCALE: u32 = 3;

/// Half-up rounding (midpoints move away from zero), matching the behaviour
/// expected of published market metrics.
const METRIC_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Convergence threshold for the Newton iteration in [`nth_root`].
const ROOT_EPSILON: Decimal = dec!(0.0000000001);

const ROOT_MAX_ITERATIONS: u32 = 100;

/// Reduce a raw decimal to metric scale.
pub fn round_metric(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(METRIC_SCALE, METRIC_ROUNDING)
}

/// Divide and reduce to metric scale.
///
/// Callers guarantee a non-zero divisor; the zero checks live with the metric
/// that owns the failure semantics, so this helper stays a pure policy point.
pub fn div_metric(numerator: Decimal, denominator: Decimal) -> Decimal {
    round_metric(numerator / denominator)
}

/// Integer-degree root of a non-negative decimal via Newton's method.
///
/// Used for the geometric mean of the all-share index. The iteration is
/// seeded from an `f64` estimate; the float only picks the starting point,
/// convergence and the returned value are pure `Decimal` arithmetic.
pub fn nth_root(value: Decimal, degree: u32) -> MarketResult<Decimal> {
    if degree == 0 {
        return Err(MarketError::InvalidArgument {
            field: "degree",
            reason: "must be at least 1",
        });
    }
    if value < Decimal::ZERO {
        return Err(MarketError::InvalidArgument {
            field: "value",
            reason: "must not be negative",
        });
    }
    if value.is_zero() || degree == 1 {
        return Ok(value);
    }

    let seed = value
        .to_f64()
        .map(|v| v.powf(1.0 / f64::from(degree)))
        .and_then(Decimal::from_f64)
        .filter(|estimate| *estimate > Decimal::ZERO)
        .unwrap_or(value);

    let n = Decimal::from(degree);
    let n_minus_one = Decimal::from(degree - 1);

    // x_{k+1} = ((n - 1) * x_k + value / x_k^(n-1)) / n
    let mut x = seed;
    for _ in 0..ROOT_MAX_ITERATIONS {
        let next = (n_minus_one * x + value / powu(x, degree - 1)) / n;
        if (next - x).abs() < ROOT_EPSILON {
            return Ok(next);
        }
        x = next;
    }

    // Return the best approximation if not fully converged
    Ok(x)
}

fn powu(base: Decimal, exponent: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..exponent {
        result *= base;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_at_metric_scale() {
        assert_eq!(round_metric(dec!(2.0004)), dec!(2.000));
        assert_eq!(round_metric(dec!(2.0005)), dec!(2.001));
        assert_eq!(round_metric(dec!(-2.0005)), dec!(-2.001));
        assert_eq!(round_metric(dec!(19.11)), dec!(19.11));
    }

    #[test]
    fn division_applies_the_policy() {
        assert_eq!(div_metric(dec!(5), dec!(3)), dec!(1.667));
        assert_eq!(div_metric(dec!(5), dec!(100)), dec!(0.05));
        assert_eq!(div_metric(dec!(100), dec!(5)), dec!(20));
    }

    #[test]
    fn nth_root_square() {
        let root = nth_root(dec!(340), 2).unwrap();
        assert_eq!(round_metric(root), dec!(18.439));
    }

    #[test]
    fn nth_root_degree_five() {
        let root = nth_root(dec!(17850000), 5).unwrap();
        assert_eq!(round_metric(root), dec!(28.205));
    }

    #[test]
    fn nth_root_identity_cases() {
        assert_eq!(nth_root(dec!(42.5), 1).unwrap(), dec!(42.5));
        assert_eq!(nth_root(Decimal::ZERO, 3).unwrap(), Decimal::ZERO);
        assert_eq!(nth_root(Decimal::ONE, 7).unwrap(), Decimal::ONE);
    }

    #[test]
    fn nth_root_rejects_bad_inputs() {
        assert!(nth_root(dec!(4), 0).is_err());
        assert!(nth_root(dec!(-4), 2).is_err());
    }
}
