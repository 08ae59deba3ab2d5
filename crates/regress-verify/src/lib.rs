//! Baseline verification for query-regress.
//!
//! This crate compares the record counts of a live run against a stored
//! baseline. Queries marked consistent must match exactly; the rest must fall
//! within a run-wide percentage tolerance.
//!
//! # Example
//!
//! ```ignore
//! use regress_verify::{compare_suites, Tolerance};
//!
//! let report = compare_suites(&live, &baseline, Tolerance::new(10.0)?)?;
//! println!("{}", report.summary());
//! assert!(report.passed());
//! ```

pub mod args;
pub mod compare;
pub mod error;
pub mod report;

pub use args::VerifyArgs;
pub use compare::{compare_count, compare_query, compare_suites, CompareResult, Tolerance};
pub use error::VerifyError;
pub use report::{QueryVerdict, VerificationReport};
