//! UUnifast utilization splitting.
//!
//! UUnifast draws n positive reals summing to a given total so that each
//! prefix sum is uniform over its feasible sub-range. Besides task
//! utilizations it is reused to split critical-section time and gap time
//! inside a task's execution budget.

use std::fmt;

use crate::rng::Rng;

/// Errors from infeasible synthesis parameters.
#[derive(Debug)]
pub enum SynthError {
    /// A split across zero parts was requested.
    NoParts,
    /// The total to split is not a positive real.
    NonPositiveTotal { total: f64 },
    /// The requested utilization sum cannot be reached by the task count.
    UtilizationExceedsTasks { total: f64, tasks: usize },
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthError::NoParts => write!(f, "cannot split a total across zero parts"),
            SynthError::NonPositiveTotal { total } => {
                write!(f, "cannot split non-positive total {total}")
            }
            SynthError::UtilizationExceedsTasks { total, tasks } => {
                write!(f, "total utilization {total} exceeds task count {tasks}")
            }
        }
    }
}

impl std::error::Error for SynthError {}

/// Split `total` into `n` positive reals with the UUnifast recurrence.
///
/// The running remainder starts at `total`; at step i a draw r in (0,1)
/// keeps `remainder * r^(1/(n-i))` for the later parts and emits the
/// difference. The result always sums to `total` (up to float rounding)
/// and every part is strictly positive.
///
/// Fails when `n` is zero or `total` is not positive. Use-case-specific
/// upper bounds (a utilization sum may not exceed the task count) are the
/// caller's concern; the recurrence itself works for any positive total,
/// which is what the critical-section and gap splits rely on.
pub fn uunifast(n: usize, total: f64, rng: &mut Rng) -> Result<Vec<f64>, SynthError> {
    if n == 0 {
        return Err(SynthError::NoParts);
    }
    if !(total > 0.0) {
        return Err(SynthError::NonPositiveTotal { total });
    }

    let mut parts = vec![0.0; n];
    let mut remainder = total;
    for i in 1..n {
        let next = remainder * rng.uniform().powf(1.0 / (n - i) as f64);
        parts[i - 1] = remainder - next;
        remainder = next;
    }
    parts[n - 1] = remainder;
    Ok(parts)
}
