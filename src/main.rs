//! Command-line interface for query-regress
//!
//! # Usage Examples
//!
//! ```bash
//! # Record a fresh baseline from a known-good analyzer build
//! query-regress update --host localhost --port 8899 --baseline tests/suite.json
//!
//! # Verify a new build against it
//! query-regress verify --baseline tests/suite.json --tolerance 10
//!
//! # Custom query catalog, no smoke check
//! query-regress verify --queries queries.yaml --skip-smoke
//! ```

use anyhow::Context;
use clap::Parser;
use query_regress::{Cli, Harness, RunMode, SmokeChecker};
use regress_suite::{FilesystemStore, QueryCatalog};
use regress_verify::{Tolerance, VerifyError};
use stream_session::StreamingSession;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let catalog = match &cli.queries {
        Some(path) => QueryCatalog::from_file(path)
            .with_context(|| format!("Failed to load query catalog from {path:?}"))?,
        None => QueryCatalog::builtin(),
    };
    let tolerance = Tolerance::new(cli.verify.tolerance)?;

    let ws_url = cli.harness.ws_url();
    info!(
        "Running {} queries against {ws_url} ({} mode)",
        catalog.len(),
        cli.mode
    );

    let session = StreamingSession::new(ws_url, cli.harness.session_config());
    let store = FilesystemStore::new(&cli.baseline);
    let mut harness = Harness::new(session, Box::new(store), tolerance);

    if cli.mode == RunMode::Verify && !cli.verify.skip_smoke {
        let smoke = SmokeChecker::new(cli.harness.entries_url(), cli.verify.smoke_concurrency)
            .context("Failed to build HTTP client for the smoke check")?;
        harness = harness.with_smoke_check(smoke);
    }

    let report = harness.execute(cli.mode, &catalog).await?;
    println!("{}", report.summary());

    if let Some(verification) = report.verification.as_ref().filter(|v| !v.passed()) {
        return Err(VerifyError::VerificationFailed {
            failed: verification.failed(),
            total: verification.total(),
        }
        .into());
    }
    if !report.passed() {
        anyhow::bail!(
            "Regression run ({}) failed: {} queries did not complete",
            cli.mode,
            report.session_failures.len()
        );
    }
    Ok(())
}
