//! Count comparison logic.

use regress_suite::{Query, Suite};
use tracing::{debug, warn};

use crate::error::VerifyError;
use crate::report::{QueryVerdict, VerificationReport};

/// Symmetric percentage band accepted around a non-deterministic count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    percent: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { percent: 10.0 }
    }
}

impl Tolerance {
    pub fn new(percent: f64) -> Result<Self, VerifyError> {
        if !percent.is_finite() || percent < 0.0 {
            return Err(VerifyError::InvalidTolerance(format!(
                "{percent} is not a non-negative percentage"
            )));
        }
        Ok(Self { percent })
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Inclusive `(lower, upper)` bounds around `expected`.
    pub fn band(&self, expected: u64) -> (f64, f64) {
        let expected = expected as f64;
        let sigma = self.percent * expected / 100.0;
        (expected - sigma, expected + sigma)
    }

    pub fn contains(&self, expected: u64, actual: u64) -> bool {
        let (lower, upper) = self.band(expected);
        let actual = actual as f64;
        lower <= actual && actual <= upper
    }
}

/// Result of comparing one live query with its baseline entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareResult {
    /// Count accepted.
    Match,
    /// Consistent query with a different count.
    CountMismatch { expected: u64, actual: u64 },
    /// Non-consistent query outside the tolerance band.
    OutOfTolerance {
        expected: u64,
        actual: u64,
        lower: f64,
        upper: f64,
    },
    /// The query at this index is not the one the baseline recorded.
    SchemaDrift {
        expected_query: String,
        actual_query: String,
    },
}

impl CompareResult {
    pub fn is_match(&self) -> bool {
        matches!(self, CompareResult::Match)
    }
}

/// Compare a live count against a baseline entry.
///
/// Consistent entries require exact equality; the rest must fall inside the
/// tolerance band.
pub fn compare_count(baseline: &Query, actual: u64, tolerance: Tolerance) -> CompareResult {
    let expected = baseline.number_of_records;
    if baseline.consistent {
        if expected == actual {
            CompareResult::Match
        } else {
            CompareResult::CountMismatch { expected, actual }
        }
    } else if tolerance.contains(expected, actual) {
        CompareResult::Match
    } else {
        let (lower, upper) = tolerance.band(expected);
        CompareResult::OutOfTolerance {
            expected,
            actual,
            lower,
            upper,
        }
    }
}

/// Compare one live query with the baseline entry at the same index.
pub fn compare_query(live: &Query, baseline: &Query, tolerance: Tolerance) -> CompareResult {
    if live.text != baseline.text {
        return CompareResult::SchemaDrift {
            expected_query: baseline.text.clone(),
            actual_query: live.text.clone(),
        };
    }
    compare_count(baseline, live.number_of_records, tolerance)
}

/// Compare a live suite with the baseline, position by position.
///
/// Every index is compared; failures are collected rather than stopping at the
/// first one. A length mismatch aborts before any comparison.
pub fn compare_suites(
    live: &Suite,
    baseline: &Suite,
    tolerance: Tolerance,
) -> Result<VerificationReport, VerifyError> {
    if live.len() != baseline.len() {
        return Err(VerifyError::LengthMismatch {
            live: live.len(),
            baseline: baseline.len(),
        });
    }

    let mut report = VerificationReport::new(tolerance.percent());
    for (index, (live_query, baseline_query)) in live.iter().zip(baseline.iter()).enumerate() {
        let result = compare_query(live_query, baseline_query, tolerance);
        debug!(
            "[{index}] {:?}: expected {}, actual {} -> {:?}",
            live_query.text, baseline_query.number_of_records, live_query.number_of_records, result
        );
        let verdict = QueryVerdict {
            index,
            query: live_query.text.clone(),
            consistent: baseline_query.consistent,
            expected: baseline_query.number_of_records,
            actual: live_query.number_of_records,
            result,
        };
        if !verdict.passed() {
            warn!("{}", verdict.describe());
        }
        report.verdicts.push(verdict);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(text: &str, count: u64, consistent: bool) -> Query {
        let mut q = Query::new(text, consistent);
        q.number_of_records = count;
        q
    }

    fn live(text: &str, count: u64) -> Query {
        baseline(text, count, false)
    }

    fn tolerance(percent: f64) -> Tolerance {
        Tolerance::new(percent).unwrap()
    }

    #[test]
    fn test_exact_match_boundary() {
        let b = baseline("amqp", 10, true);
        assert_eq!(compare_count(&b, 10, tolerance(10.0)), CompareResult::Match);
        assert_eq!(
            compare_count(&b, 11, tolerance(10.0)),
            CompareResult::CountMismatch {
                expected: 10,
                actual: 11
            }
        );
        assert_eq!(
            compare_count(&b, 9, tolerance(10.0)),
            CompareResult::CountMismatch {
                expected: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn test_tolerance_boundary() {
        let b = baseline("http", 100, false);
        let t = tolerance(10.0);
        assert!(compare_count(&b, 110, t).is_match());
        assert!(compare_count(&b, 90, t).is_match());
        assert!(!compare_count(&b, 111, t).is_match());
        assert!(!compare_count(&b, 89, t).is_match());
    }

    #[test]
    fn test_tolerance_boundary_other_percentages() {
        let b = baseline("redis", 120, false);
        assert!(compare_count(&b, 126, tolerance(5.0)).is_match());
        assert!(!compare_count(&b, 127, tolerance(5.0)).is_match());
        assert!(compare_count(&b, 144, tolerance(20.0)).is_match());
        assert!(!compare_count(&b, 145, tolerance(20.0)).is_match());
    }

    #[test]
    fn test_fractional_band() {
        let b = baseline("protocolX and field == 'v'", 42, false);
        let t = tolerance(10.0);
        assert!(compare_count(&b, 46, t).is_match());
        assert!(compare_count(&b, 38, t).is_match());
        assert!(!compare_count(&b, 37, t).is_match());
        match compare_count(&b, 47, t) {
            CompareResult::OutOfTolerance {
                expected,
                actual,
                lower,
                upper,
            } => {
                assert_eq!(expected, 42);
                assert_eq!(actual, 47);
                assert!((lower - 37.8).abs() < 1e-9);
                assert!((upper - 46.2).abs() < 1e-9);
            }
            other => panic!("expected OutOfTolerance, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_baseline_count() {
        let b = baseline("", 0, false);
        assert!(compare_count(&b, 0, tolerance(10.0)).is_match());
        assert!(!compare_count(&b, 1, tolerance(10.0)).is_match());
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(Tolerance::new(-1.0).is_err());
        assert!(Tolerance::new(f64::NAN).is_err());
        assert!(Tolerance::new(f64::INFINITY).is_err());
        assert!(Tolerance::new(0.0).is_ok());
    }

    #[test]
    fn test_schema_drift() {
        let result = compare_query(
            &live("kafka", 3),
            &baseline("redis", 3, true),
            tolerance(10.0),
        );
        assert_eq!(
            result,
            CompareResult::SchemaDrift {
                expected_query: "redis".to_string(),
                actual_query: "kafka".to_string()
            }
        );
    }

    #[test]
    fn test_length_mismatch_aborts() {
        let live_suite: Suite = vec![live("a", 1), live("b", 2)].into_iter().collect();
        let baseline_suite: Suite = vec![baseline("a", 1, true)].into_iter().collect();

        let err = compare_suites(&live_suite, &baseline_suite, tolerance(10.0)).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::LengthMismatch {
                live: 2,
                baseline: 1
            }
        ));
    }

    #[test]
    fn test_compare_suites_collects_all_failures() {
        let live_suite: Suite = vec![live("a", 5), live("b", 0), live("c", 200), live("d", 7)]
            .into_iter()
            .collect();
        let baseline_suite: Suite = vec![
            baseline("a", 4, true),
            baseline("b", 0, false),
            baseline("c", 120, true),
            baseline("d", 7, true),
        ]
        .into_iter()
        .collect();

        let report = compare_suites(&live_suite, &baseline_suite, tolerance(10.0)).unwrap();

        assert!(!report.passed());
        assert_eq!(report.total(), 4);
        assert_eq!(report.failed(), 2);
        let failed: Vec<usize> = report.failures().map(|v| v.index).collect();
        assert_eq!(failed, vec![0, 2]);
    }

    #[test]
    fn test_identical_suites_pass() {
        let suite: Suite = vec![baseline("a", 5, true), baseline("b", 0, false), baseline("c", 120, true)]
            .into_iter()
            .collect();
        let report = compare_suites(&suite, &suite, tolerance(10.0)).unwrap();
        assert!(report.passed());
        assert_eq!(report.matched(), 3);
    }
}
