//! Suite execution: run every query in order, then update or verify.

use regress_suite::{BaselineStore, QueryCatalog, Suite};
use regress_verify::{compare_suites, Tolerance, VerificationReport, VerifyError};
use stream_session::{QueryStream, SessionError};
use tracing::{error, info, warn};

use crate::{RunMode, SmokeChecker};

/// A query whose session ended without a trustworthy count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub index: usize,
    pub query: String,
    pub error: SessionError,
}

/// Live results of one pass over the catalog.
#[derive(Debug, Clone, Default)]
pub struct SuiteRun {
    pub suite: Suite,
    pub failures: Vec<SessionFailure>,
}

/// Runs the queries of a catalog strictly one after another.
pub struct SuiteRunner<Q> {
    streamer: Q,
}

impl<Q: QueryStream> SuiteRunner<Q> {
    pub fn new(streamer: Q) -> Self {
        Self { streamer }
    }

    /// Stream every query of `catalog`, in order.
    ///
    /// A failed session is recorded and the run moves on to the next query.
    pub async fn run(&self, catalog: &QueryCatalog) -> SuiteRun {
        let total = catalog.len();
        let mut run = SuiteRun::default();

        for (index, mut query) in catalog.queries().enumerate() {
            info!("[{}/{}] Running query {:?}...", index + 1, total, query.text);

            let outcome = self.streamer.stream_query(&query.text).await;
            if let Some(error) = outcome.error() {
                warn!("[{}/{}] Query {:?} failed: {error}", index + 1, total, query.text);
                run.failures.push(SessionFailure {
                    index,
                    query: query.text.clone(),
                    error: error.clone(),
                });
            }

            query.record_ids(outcome.ids);
            info!("Streamed {} entries.", query.number_of_records);
            run.suite.push(query);
        }

        run
    }
}

/// Everything a run produced, for the final report and exit status.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    pub queries: usize,
    pub session_failures: Vec<SessionFailure>,
    /// Set in verify mode once the comparison ran.
    pub verification: Option<VerificationReport>,
    /// Set in update mode once the baseline was written.
    pub baseline_written: Option<String>,
    /// Records fetched by the smoke check, if it ran.
    pub smoke_fetched: Option<usize>,
}

impl RunReport {
    fn new(mode: RunMode, run: &SuiteRun) -> Self {
        Self {
            mode,
            queries: run.suite.len(),
            session_failures: run.failures.clone(),
            verification: None,
            baseline_written: None,
            smoke_fetched: None,
        }
    }

    pub fn passed(&self) -> bool {
        if !self.session_failures.is_empty() {
            return false;
        }
        match self.mode {
            RunMode::Update => self.baseline_written.is_some(),
            RunMode::Verify => self
                .verification
                .as_ref()
                .map(VerificationReport::passed)
                .unwrap_or(false),
        }
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Regression run ({}): {}\n\
             Queries: {}\n\
             Session failures: {}\n",
            self.mode,
            if self.passed() { "PASSED" } else { "FAILED" },
            self.queries,
            self.session_failures.len()
        );

        for failure in &self.session_failures {
            summary.push_str(&format!(
                "- [{}] {:?}: {}\n",
                failure.index, failure.query, failure.error
            ));
        }

        if let Some(fetched) = self.smoke_fetched {
            summary.push_str(&format!("Smoke check: {fetched} records fetched\n"));
        }

        if let Some(path) = &self.baseline_written {
            summary.push_str(&format!("The test suite is saved into: {path}\n"));
        } else if self.mode == RunMode::Update {
            summary.push_str("Baseline not written: some sessions failed\n");
        }

        if let Some(verification) = &self.verification {
            summary.push('\n');
            summary.push_str(&verification.summary());
        }

        summary
    }
}

/// Ties the runner to a baseline store and, for verify runs, a smoke checker.
pub struct Harness<Q> {
    runner: SuiteRunner<Q>,
    store: Box<dyn BaselineStore>,
    smoke: Option<SmokeChecker>,
    tolerance: Tolerance,
}

impl<Q: QueryStream> Harness<Q> {
    pub fn new(streamer: Q, store: Box<dyn BaselineStore>, tolerance: Tolerance) -> Self {
        Self {
            runner: SuiteRunner::new(streamer),
            store,
            smoke: None,
            tolerance,
        }
    }

    /// Fetch the first query's records in full before comparing counts.
    pub fn with_smoke_check(mut self, smoke: SmokeChecker) -> Self {
        self.smoke = Some(smoke);
        self
    }

    pub async fn execute(
        &self,
        mode: RunMode,
        catalog: &QueryCatalog,
    ) -> Result<RunReport, VerifyError> {
        match mode {
            RunMode::Update => self.update(catalog).await,
            RunMode::Verify => self.verify(catalog).await,
        }
    }

    /// Run the suite and overwrite the baseline with the live counts.
    ///
    /// Nothing is written if any session failed.
    pub async fn update(&self, catalog: &QueryCatalog) -> Result<RunReport, VerifyError> {
        let mut run = self.runner.run(catalog).await;
        let mut report = RunReport::new(RunMode::Update, &run);

        if !run.failures.is_empty() {
            error!(
                "{} queries failed; keeping the existing baseline at {}",
                run.failures.len(),
                self.store.location()
            );
            return Ok(report);
        }

        run.suite.strip_ids();
        self.store.save(&run.suite).await?;
        info!("The test suite is saved into: {}", self.store.location());
        report.baseline_written = Some(self.store.location());
        Ok(report)
    }

    /// Run the suite and compare it with the stored baseline.
    ///
    /// Smoke-check failures, a missing or unreadable baseline, and a query
    /// count mismatch abort the run. Count mismatches are collected in the
    /// report.
    pub async fn verify(&self, catalog: &QueryCatalog) -> Result<RunReport, VerifyError> {
        let mut run = self.runner.run(catalog).await;
        let mut report = RunReport::new(RunMode::Verify, &run);

        if let (Some(smoke), Some(first)) = (&self.smoke, run.suite.first()) {
            report.smoke_fetched = Some(smoke.check(first).await?);
        }

        run.suite.strip_ids();
        let baseline = self.store.load().await?;
        let verification = compare_suites(&run.suite, &baseline, self.tolerance)?;
        if verification.passed() {
            info!("All {} queries match the baseline", verification.total());
        } else {
            error!(
                "{} of {} queries do not match the baseline",
                verification.failed(),
                verification.total()
            );
        }
        report.verification = Some(verification);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use regress_suite::{BaselineError, Query};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use stream_session::{SessionOutcome, Termination};

    /// Replays canned outcomes keyed by query text.
    struct ScriptedStream {
        outcomes: HashMap<String, SessionOutcome>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedStream {
        fn new(outcomes: Vec<(&str, SessionOutcome)>) -> Self {
            Self {
                outcomes: outcomes
                    .into_iter()
                    .map(|(q, o)| (q.to_string(), o))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QueryStream for ScriptedStream {
        async fn stream_query(&self, query: &str) -> SessionOutcome {
            self.calls.lock().unwrap().push(query.to_string());
            self.outcomes
                .get(query)
                .cloned()
                .unwrap_or_else(|| SessionOutcome::failed(Vec::new(), SessionError::ChannelClosed))
        }
    }

    /// In-memory baseline store.
    #[derive(Default)]
    struct MemoryStore {
        suite: Mutex<Option<Suite>>,
    }

    #[async_trait]
    impl BaselineStore for MemoryStore {
        async fn save(&self, suite: &Suite) -> Result<(), BaselineError> {
            *self.suite.lock().unwrap() = Some(suite.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Suite, BaselineError> {
            self.suite
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| BaselineError::NotFound("memory".into()))
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    fn completed(ids: Vec<u64>) -> SessionOutcome {
        SessionOutcome {
            ids,
            termination: Termination::Completed,
        }
    }

    fn catalog(yaml: &str) -> QueryCatalog {
        QueryCatalog::from_yaml(yaml).unwrap()
    }

    fn stored(entries: &[(&str, u64, bool)]) -> Box<MemoryStore> {
        let suite: Suite = entries
            .iter()
            .map(|(text, count, consistent)| {
                let mut q = Query::new(*text, *consistent);
                q.number_of_records = *count;
                q
            })
            .collect();
        Box::new(MemoryStore {
            suite: Mutex::new(Some(suite)),
        })
    }

    #[tokio::test]
    async fn test_runner_runs_in_catalog_order() {
        let stream = ScriptedStream::new(vec![
            ("b", completed(vec![1])),
            ("a", completed(vec![2, 3])),
        ]);
        let runner = SuiteRunner::new(stream);

        let run = runner
            .run(&catalog("- query: a\n- query: b\n  consistent: true\n"))
            .await;

        assert_eq!(*runner.streamer.calls.lock().unwrap(), vec!["a", "b"]);
        assert!(run.failures.is_empty());
        assert_eq!(run.suite.queries[0].number_of_records, 2);
        assert_eq!(run.suite.queries[1].number_of_records, 1);
        assert!(run.suite.queries[1].consistent);
    }

    #[tokio::test]
    async fn test_accumulators_are_isolated_per_query() {
        let stream = ScriptedStream::new(vec![
            ("first", completed(vec![10, 11, 12])),
            ("second", completed(vec![20])),
        ]);
        let run = SuiteRunner::new(stream)
            .run(&catalog("- query: first\n- query: second\n"))
            .await;

        assert_eq!(run.suite.queries[0].ids, vec![10, 11, 12]);
        assert_eq!(run.suite.queries[1].ids, vec![20]);
    }

    #[tokio::test]
    async fn test_failed_session_does_not_stop_run() {
        let stream = ScriptedStream::new(vec![
            (
                "slow",
                SessionOutcome::failed(
                    vec![1, 2],
                    SessionError::TimedOut(std::time::Duration::from_secs(1)),
                ),
            ),
            ("fast", completed(vec![3])),
        ]);
        let run = SuiteRunner::new(stream)
            .run(&catalog("- query: slow\n- query: fast\n"))
            .await;

        assert_eq!(run.suite.len(), 2);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].index, 0);
        assert_eq!(run.failures[0].query, "slow");
        assert_eq!(run.suite.queries[1].number_of_records, 1);
    }

    #[tokio::test]
    async fn test_update_then_verify_passes() {
        let outcomes = || {
            ScriptedStream::new(vec![
                ("amqp", completed(vec![1, 2, 3, 4, 5])),
                ("http", completed(vec![])),
                ("redis", completed((0..120).collect())),
            ])
        };
        let cat = catalog(
            "- query: amqp\n  consistent: true\n- query: http\n- query: redis\n  consistent: true\n",
        );

        let store = std::sync::Arc::new(MemoryStore::default());
        let update = Harness::new(outcomes(), Box::new(SharedStore(store.clone())), Tolerance::default())
            .update(&cat)
            .await
            .unwrap();
        assert!(update.passed());
        assert_eq!(update.baseline_written.as_deref(), Some("memory"));

        let verify = Harness::new(outcomes(), Box::new(SharedStore(store)), Tolerance::default())
            .verify(&cat)
            .await
            .unwrap();
        assert!(verify.passed(), "{}", verify.summary());
    }

    struct SharedStore(std::sync::Arc<MemoryStore>);

    #[async_trait]
    impl BaselineStore for SharedStore {
        async fn save(&self, suite: &Suite) -> Result<(), BaselineError> {
            self.0.save(suite).await
        }

        async fn load(&self) -> Result<Suite, BaselineError> {
            self.0.load().await
        }

        fn location(&self) -> String {
            self.0.location()
        }
    }

    #[tokio::test]
    async fn test_update_refuses_partial_baseline() {
        let stream = ScriptedStream::new(vec![("ok", completed(vec![1]))]);
        let store = std::sync::Arc::new(MemoryStore::default());
        let report = Harness::new(stream, Box::new(SharedStore(store.clone())), Tolerance::default())
            .update(&catalog("- query: ok\n- query: broken\n"))
            .await
            .unwrap();

        assert!(!report.passed());
        assert!(report.baseline_written.is_none());
        assert!(store.suite.lock().unwrap().is_none());
        assert!(report.summary().contains("Baseline not written"));
    }

    #[tokio::test]
    async fn test_verify_reports_all_mismatches() {
        let stream = ScriptedStream::new(vec![
            ("a", completed(vec![1, 2])),
            ("b", completed((0..47).collect())),
            ("c", completed(vec![1])),
        ]);
        let report = Harness::new(
            stream,
            stored(&[("a", 3, true), ("b", 42, false), ("c", 1, true)]),
            Tolerance::new(10.0).unwrap(),
        )
        .verify(&catalog("- query: a\n- query: b\n- query: c\n"))
        .await
        .unwrap();

        assert!(!report.passed());
        let verification = report.verification.unwrap();
        assert_eq!(verification.failed(), 2);
        assert_eq!(verification.matched(), 1);
    }

    #[tokio::test]
    async fn test_verify_within_tolerance_passes() {
        let stream = ScriptedStream::new(vec![(
            "protocolX and field == 'v'",
            completed((0..46).collect()),
        )]);
        let report = Harness::new(
            stream,
            stored(&[("protocolX and field == 'v'", 42, false)]),
            Tolerance::new(10.0).unwrap(),
        )
        .verify(&catalog("- query: \"protocolX and field == 'v'\"\n"))
        .await
        .unwrap();

        assert!(report.passed(), "{}", report.summary());
    }

    #[tokio::test]
    async fn test_verify_session_failure_fails_run() {
        let stream = ScriptedStream::new(vec![("a", completed(vec![1]))]);
        let report = Harness::new(
            stream,
            stored(&[("a", 1, true), ("b", 0, true)]),
            Tolerance::default(),
        )
        .verify(&catalog("- query: a\n- query: b\n"))
        .await
        .unwrap();

        // "b" failed with zero ids, which matches its baseline count, yet the run fails.
        assert!(report.verification.as_ref().unwrap().passed());
        assert!(!report.passed());
        assert_eq!(report.session_failures.len(), 1);
    }

    #[tokio::test]
    async fn test_verify_missing_baseline_is_fatal() {
        let stream = ScriptedStream::new(vec![("a", completed(vec![1]))]);
        let err = Harness::new(stream, Box::new(MemoryStore::default()), Tolerance::default())
            .verify(&catalog("- query: a\n"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VerifyError::Baseline(BaselineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_length_mismatch_is_fatal() {
        let stream = ScriptedStream::new(vec![("a", completed(vec![1]))]);
        let err = Harness::new(
            stream,
            stored(&[("a", 1, true), ("b", 1, true)]),
            Tolerance::default(),
        )
        .verify(&catalog("- query: a\n"))
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            VerifyError::LengthMismatch {
                live: 1,
                baseline: 2
            }
        ));
    }
}
