//! Compact formatting helpers for trace output.

use std::fmt;

use crate::types::Time;

/// Timestamp formatter for trace output.
///
/// Simulated times are reals in the period unit; they are printed with
/// millisecond precision, right-aligned in a 12-char field so trace lines
/// stay columnar:
///
/// - `0.0` → `       0.000`
/// - `3.001` → `       3.001`
/// - `1234.5` → `    1234.500`
pub struct FmtT(pub Time);

impl fmt::Display for FmtT {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12.3}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_t() {
        assert_eq!(FmtT(0.0).to_string(), "       0.000");
        assert_eq!(FmtT(3.001).to_string(), "       3.001");
        assert_eq!(FmtT(10.0).to_string(), "      10.000");
        assert_eq!(FmtT(1234.5).to_string(), "    1234.500");
    }
}
