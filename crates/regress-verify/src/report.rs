//! Verification report types.

use crate::compare::CompareResult;

/// Outcome of comparing one query with its baseline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVerdict {
    /// Position in the suite.
    pub index: usize,
    /// Live query text.
    pub query: String,
    /// Whether the baseline demanded an exact match.
    pub consistent: bool,
    /// Baseline count.
    pub expected: u64,
    /// Live count.
    pub actual: u64,
    pub result: CompareResult,
}

impl QueryVerdict {
    pub fn passed(&self) -> bool {
        self.result.is_match()
    }

    /// One-line description naming the query, expected and actual counts.
    pub fn describe(&self) -> String {
        match &self.result {
            CompareResult::Match => format!(
                "[{}] PASS {:?}: {} records (expected {})",
                self.index, self.query, self.actual, self.expected
            ),
            CompareResult::CountMismatch { expected, actual } => format!(
                "[{}] FAIL {:?}: expected exactly {expected} records, got {actual}",
                self.index, self.query
            ),
            CompareResult::OutOfTolerance {
                expected,
                actual,
                lower,
                upper,
            } => format!(
                "[{}] FAIL {:?}: expected {expected} records (accepted {lower:.1}..={upper:.1}), got {actual}",
                self.index, self.query
            ),
            CompareResult::SchemaDrift {
                expected_query,
                actual_query,
            } => format!(
                "[{}] FAIL schema drift: baseline has {expected_query:?}, live run has {actual_query:?}",
                self.index
            ),
        }
    }
}

/// Per-query verdicts for one verification run.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub tolerance_percent: f64,
    pub verdicts: Vec<QueryVerdict>,
}

impl VerificationReport {
    pub fn new(tolerance_percent: f64) -> Self {
        Self {
            tolerance_percent,
            verdicts: Vec::new(),
        }
    }

    /// Check if every query matched its baseline.
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(QueryVerdict::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &QueryVerdict> {
        self.verdicts.iter().filter(|v| !v.passed())
    }

    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn matched(&self) -> usize {
        self.verdicts.iter().filter(|v| v.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.matched()
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Baseline comparison: {}\n\
             ====================\n\
             Tolerance: {}%\n\
             Queries: {}\n\
             - Matched: {}\n\
             - Failed: {}\n",
            if self.passed() { "PASSED" } else { "FAILED" },
            self.tolerance_percent,
            self.total(),
            self.matched(),
            self.failed()
        );

        if self.failed() > 0 {
            summary.push_str("\nFailures:\n");
            for verdict in self.failures() {
                summary.push_str(&format!("- {}\n", verdict.describe()));
            }
        }

        summary
    }
}
