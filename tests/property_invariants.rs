//! Randomized Invariant Tests
//!
//! Random step-like production and noisy prices from a seeded generator.
//! Whatever the data, the structural guarantees of the result must hold.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use watervalue::estimator::{LevelDiscretizer, MonotonicEnforcer, Segmenter};
use watervalue::{
    BreakpointFlag, EstimationMethod, EstimatorConfig, IntervalBounds, RawSeries,
    WaterValueEstimator,
};

const T0: i64 = 1_699_920_000;
const CASES: u64 = 25;

/// Production with a handful of random plateaus plus noise, and a price
/// loosely following production.
fn random_plant(rng: &mut StdRng) -> (RawSeries, RawSeries) {
    let n = rng.gen_range(60..160);
    let mut production = Vec::with_capacity(n);
    let mut price = Vec::with_capacity(n);
    let mut level = rng.gen_range(0.0..400.0);
    for _ in 0..n {
        if rng.gen_bool(0.05) {
            level = rng.gen_range(0.0..400.0);
        }
        production.push(level + rng.gen_range(-5.0..5.0));
        price.push(20.0 + level / 10.0 + rng.gen_range(-3.0..3.0));
    }
    let ts: Vec<f64> = (0..n as i64).map(|i| (T0 + i * 240) as f64).collect();
    (
        RawSeries::new(ts.clone(), production),
        RawSeries::new(ts, price),
    )
}

fn non_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

#[test]
fn water_values_are_ordered_for_both_methods() {
    let mut rng = StdRng::seed_from_u64(7);
    let limits = vec![50.0, 150.0, 250.0, 350.0];

    for _ in 0..CASES {
        let (production, price) = random_plant(&mut rng);
        for method in EstimationMethod::ALL {
            let config = EstimatorConfig {
                method,
                ..EstimatorConfig::with_limits(limits.clone())
            };
            let result = WaterValueEstimator::estimate(&production, &price, &config).unwrap();

            assert_eq!(result.water_values.len(), 2 * limits.len());
            let present = non_nan(&result.water_values);
            assert!(
                present.windows(2).all(|w| w[0] <= w[1]),
                "{method}: {:?}",
                result.water_values
            );
            for row in result.intervals() {
                assert!(row.lower <= row.upper);
            }
        }
    }
}

#[test]
fn per_sample_outputs_are_consistent() {
    let mut rng = StdRng::seed_from_u64(11);
    let limits = vec![100.0, 200.0, 300.0];

    for _ in 0..CASES {
        let (production, price) = random_plant(&mut rng);
        let config = EstimatorConfig::with_limits(limits.clone());
        let result = WaterValueEstimator::estimate(&production, &price, &config).unwrap();
        let n = result.timestamps.len();

        assert_eq!(result.level_means.len(), n);
        assert_eq!(result.production_levels.len(), n);
        assert_eq!(result.breakpoints.len(), n);
        assert!(result.production_levels.iter().all(|l| *l <= limits.len()));
        assert!(result.segment_count >= 1 && result.segment_count <= 24.min(n));

        // the first sample never starts a new segment
        assert_eq!(result.breakpoints[0], BreakpointFlag::Interior);
        let boundaries = result.breakpoints.iter().filter(|f| f.is_boundary()).count();
        assert_eq!(boundaries, result.segment_count - 1);

        // level means change exactly at flagged samples
        for i in 1..n {
            let changed = result.level_means[i] != result.level_means[i - 1];
            if changed {
                assert!(result.breakpoints[i].is_boundary(), "unflagged change at {i}");
            }
        }
        assert_eq!(
            result.production_levels,
            LevelDiscretizer::discretize(&result.level_means, &limits)
        );
    }
}

#[test]
fn segmentation_objective_never_increases() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..CASES {
        let n = rng.gen_range(10..80);
        let values: Vec<f64> = (0..n).map(|_| rng.gen_range(-100.0..100.0)).collect();
        let fit = Segmenter::fit(&values, None, 0.5).unwrap();
        assert_eq!(fit.objective.len(), 24.min(n));
        for w in fit.objective.windows(2) {
            assert!(w[1] <= w[0] + 1e-6 * w[0].abs().max(1.0));
        }
    }
}

#[test]
fn enforcement_orders_random_bounds() {
    let mut rng = StdRng::seed_from_u64(41);
    for _ in 0..CASES {
        let n = rng.gen_range(1..8);
        let mut pick = |rng: &mut StdRng| {
            if rng.gen_bool(0.3) {
                f64::NAN
            } else {
                rng.gen_range(0.0..100.0)
            }
        };
        let bounds = IntervalBounds {
            lower: (0..n).map(|_| pick(&mut rng)).collect(),
            upper: (0..n).map(|_| pick(&mut rng)).collect(),
        };
        let enforced = MonotonicEnforcer::enforce(&bounds);

        let mut previous_upper = f64::NEG_INFINITY;
        for i in 0..n {
            let (l, u) = (enforced.lower[i], enforced.upper[i]);
            assert_eq!(l.is_nan(), u.is_nan(), "one-sided NaN at {i}");
            if l.is_nan() {
                continue;
            }
            assert!(l <= u);
            assert!(l >= previous_upper);
            previous_upper = u;
        }

        let points = MonotonicEnforcer::water_values(&enforced, false);
        let uppers = non_nan(&enforced.upper);
        assert_eq!(non_nan(&points), uppers);
    }
}
