//! Element-wise quadratic evaluation, sequential and on a worker pool
//!
//! Both variants pair `xs[i]` with `ys[i]` and compute `2·x² + a − 1`. How
//! inputs of different lengths are paired is an explicit [`PairingPolicy`].

pub mod benchmark;
pub mod chart;

use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use benchmark::{run_benchmark, write_timings_csv, BenchmarkOptions, Method, TimingRecord};
pub use chart::{render_chart, ChartRenderer};

/// `y = 2x² + a − 1`, or [`Error::Overflow`] when the result does not fit an
/// `i64`.
pub fn quadratic(x: i64, a: i64) -> Result<i64> {
    // Widened so an oversized 2x² can still be pulled back by a negative `a`.
    let (wide_x, wide_a) = (i128::from(x), i128::from(a));
    wide_x
        .checked_mul(wide_x)
        .and_then(|sq| sq.checked_mul(2))
        .and_then(|y| y.checked_add(wide_a - 1))
        .and_then(|y| i64::try_from(y).ok())
        .ok_or(Error::Overflow { x, a })
}

/// How to pair two input sequences of different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingPolicy {
    /// Pair up to the shorter length and drop the tail of the longer one.
    #[default]
    Truncate,
    /// Refuse inputs of different lengths.
    Strict,
}

/// Number of pairs `policy` yields for inputs of length `left` and `right`.
pub fn paired_len(left: usize, right: usize, policy: PairingPolicy) -> Result<usize> {
    if left == right {
        return Ok(left);
    }
    match policy {
        PairingPolicy::Strict => Err(Error::LengthMismatch { left, right }),
        PairingPolicy::Truncate => {
            let len = left.min(right);
            warn!(
                "Input lengths differ ({} vs {}); truncating to {}",
                left, right, len
            );
            Ok(len)
        }
    }
}

pub fn evaluate_sequential(xs: &[i64], ys: &[i64], policy: PairingPolicy) -> Result<Vec<i64>> {
    let len = paired_len(xs.len(), ys.len(), policy)?;
    xs[..len]
        .iter()
        .zip(&ys[..len])
        .map(|(&x, &a)| quadratic(x, a))
        .collect()
}

/// Evaluate on `pool`; the output order matches the input order.
pub fn evaluate_parallel(
    pool: &WorkerPool,
    xs: &[i64],
    ys: &[i64],
    policy: PairingPolicy,
) -> Result<Vec<i64>> {
    let len = paired_len(xs.len(), ys.len(), policy)?;
    let pairs: Vec<(i64, i64)> = xs[..len].iter().copied().zip(ys[..len].iter().copied()).collect();

    debug!(
        "Evaluating {} pairs on {} workers",
        pairs.len(),
        pool.workers()
    );
    pool.map(pairs, |(x, a)| quadratic(x, a))?
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_values() {
        assert_eq!(quadratic(3, 1).unwrap(), 18);
        assert_eq!(quadratic(0, 0).unwrap(), -1);
        assert_eq!(quadratic(-2, 5).unwrap(), 12);
    }

    #[test]
    fn test_overflow_is_an_error() {
        // Largest x whose doubled square still fits.
        let x = 2_147_483_647;
        assert_eq!(quadratic(x, 1).unwrap(), 2 * x * x);
        assert!(matches!(
            quadratic(3_037_000_500, 0),
            Err(Error::Overflow { x: 3_037_000_500, a: 0 })
        ));
        assert!(matches!(
            quadratic(0, i64::MIN),
            Err(Error::Overflow { .. })
        ));
        // 2x² alone exceeds i64 here, the full result does not.
        assert_eq!(quadratic(1 << 31, -1).unwrap(), i64::MAX - 1);
        assert!(matches!(
            quadratic(i64::MIN, i64::MAX),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn test_overflow_matches_across_variants() {
        let pool = WorkerPool::new(2).unwrap();
        let xs = [1, 3_037_000_500, 2];
        let ys = [0, 0, 0];

        let seq = evaluate_sequential(&xs, &ys, PairingPolicy::Strict).unwrap_err();
        let par = evaluate_parallel(&pool, &xs, &ys, PairingPolicy::Strict).unwrap_err();
        for err in [seq, par] {
            assert!(matches!(
                err,
                Error::Overflow { x: 3_037_000_500, a: 0 }
            ));
        }
        pool.shutdown();
    }

    #[test]
    fn test_sequential_preserves_order() {
        let results = evaluate_sequential(&[0, 1, 2, 3], &[0, 1, 2, 3], PairingPolicy::Truncate)
            .unwrap();
        assert_eq!(results, vec![-1, 2, 9, 20]);
    }

    #[test]
    fn test_truncates_to_shorter_input() {
        let xs = [1, 2, 3, 4, 5];
        let ys = [1, 1, 1];
        let results = evaluate_sequential(&xs, &ys, PairingPolicy::Truncate).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results, vec![2, 8, 18]);

        let results = evaluate_sequential(&ys, &xs, PairingPolicy::Truncate).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_strict_rejects_mismatch() {
        let err = evaluate_sequential(&[1, 2, 3, 4, 5], &[1, 2, 3], PairingPolicy::Strict)
            .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { left: 5, right: 3 }));

        assert_eq!(
            evaluate_sequential(&[2], &[2], PairingPolicy::Strict).unwrap(),
            vec![9]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pool = WorkerPool::new(4).unwrap();
        for len in [0usize, 1, 2, 7, 100, 1_000] {
            let xs: Vec<i64> = (0..len as i64).collect();
            let ys: Vec<i64> = (0..len as i64).rev().collect();
            let seq = evaluate_sequential(&xs, &ys, PairingPolicy::Strict).unwrap();
            let par = evaluate_parallel(&pool, &xs, &ys, PairingPolicy::Strict).unwrap();
            assert_eq!(seq, par, "length {len}");
        }
    }

    #[test]
    fn test_parallel_truncation_and_strict() {
        let pool = WorkerPool::new(2).unwrap();
        let xs = [1, 2, 3, 4, 5];
        let ys = [1, 1, 1];
        assert_eq!(
            evaluate_parallel(&pool, &xs, &ys, PairingPolicy::Truncate)
                .unwrap()
                .len(),
            3
        );
        assert!(matches!(
            evaluate_parallel(&pool, &xs, &ys, PairingPolicy::Strict),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
