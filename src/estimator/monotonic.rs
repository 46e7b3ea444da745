//! Ordering of interval bounds and assembly of the output vector.
//!
//! Water values must satisfy `lower₁ ≤ upper₁ ≤ lower₂ ≤ upper₂ ≤ …` over
//! the intervals that carry any evidence.

use crate::types::IntervalBounds;

/// Bound ordering and output assembly
pub struct MonotonicEnforcer;

impl MonotonicEnforcer {
    /// Order the bounds.
    ///
    /// Intervals with no bound stay NaN and are skipped. A single missing
    /// bound copies its sibling. Each lower bound is then lifted to the
    /// largest upper bound seen so far, and the upper bound to its lower.
    pub fn enforce(bounds: &IntervalBounds) -> IntervalBounds {
        let mut lower = bounds.lower.clone();
        let mut upper = bounds.upper.clone();
        let mut running_max = f64::NEG_INFINITY;

        for idx in 0..upper.len() {
            if lower[idx].is_nan() && upper[idx].is_nan() {
                continue;
            }
            if upper[idx].is_nan() {
                upper[idx] = lower[idx];
            }
            if lower[idx].is_nan() {
                lower[idx] = upper[idx];
            }

            lower[idx] = lower[idx].max(running_max);
            if upper[idx] < lower[idx] {
                upper[idx] = lower[idx];
            }
            running_max = running_max.max(upper[idx]);
        }

        IntervalBounds { lower, upper }
    }

    /// Final water value vector from enforced bounds.
    ///
    /// Interval output interleaves `[lower₁, upper₁, lower₂, …]`; point output
    /// keeps the upper bounds. Either way a running maximum runs over the
    /// non-NaN entries.
    pub fn water_values(bounds: &IntervalBounds, interval_output: bool) -> Vec<f64> {
        let mut values: Vec<f64> = if interval_output {
            bounds
                .lower
                .iter()
                .zip(bounds.upper.iter())
                .flat_map(|(l, u)| [*l, *u])
                .collect()
        } else {
            bounds.upper.clone()
        };

        let mut running_max = f64::NEG_INFINITY;
        for v in values.iter_mut().filter(|v| !v.is_nan()) {
            running_max = running_max.max(*v);
            *v = running_max;
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAN: f64 = f64::NAN;

    fn bounds(lower: &[f64], upper: &[f64]) -> IntervalBounds {
        IntervalBounds {
            lower: lower.to_vec(),
            upper: upper.to_vec(),
        }
    }

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
    }

    #[test]
    fn test_sibling_fill() {
        let out = MonotonicEnforcer::enforce(&bounds(&[NAN, 30.0], &[10.0, NAN]));
        assert!(same(&out.lower, &[10.0, 30.0]));
        assert!(same(&out.upper, &[10.0, 30.0]));
    }

    #[test]
    fn test_all_nan_interval_skipped() {
        let out = MonotonicEnforcer::enforce(&bounds(&[5.0, NAN, 1.0], &[8.0, NAN, 2.0]));
        assert!(same(&out.lower, &[5.0, NAN, 8.0]));
        assert!(same(&out.upper, &[8.0, NAN, 8.0]));
    }

    #[test]
    fn test_lower_lifted_to_running_max() {
        let out = MonotonicEnforcer::enforce(&bounds(&[10.0, 5.0], &[40.0, 50.0]));
        assert!(same(&out.lower, &[10.0, 40.0]));
        assert!(same(&out.upper, &[40.0, 50.0]));
    }

    #[test]
    fn test_interleaved_output() {
        let enforced = bounds(&[NAN, 20.0], &[NAN, 80.0]);
        let values = MonotonicEnforcer::water_values(&enforced, true);
        assert!(same(&values, &[NAN, NAN, 20.0, 80.0]));
    }

    #[test]
    fn test_point_output_running_max() {
        let enforced = bounds(&[1.0, NAN, 2.0], &[12.0, NAN, 9.0]);
        let values = MonotonicEnforcer::water_values(&enforced, false);
        assert!(same(&values, &[12.0, NAN, 12.0]));
    }

    #[test]
    fn test_empty_bounds() {
        let empty = IntervalBounds::unknown(0);
        assert!(MonotonicEnforcer::enforce(&empty).is_empty());
        assert!(MonotonicEnforcer::water_values(&empty, true).is_empty());
    }
}
