//! Query Regress Library
//!
//! A regression harness for a streaming query analyzer: it issues a fixed
//! suite of filter queries over the analyzer's WebSocket subscription channel,
//! counts the records each one streams back, and checks those counts against a
//! stored baseline.
//!
//! # Features
//!
//! - Update mode: run the suite and overwrite the baseline with the live counts
//! - Verify mode: run the suite, smoke-check that streamed records can be
//!   fetched in full, and compare counts with the baseline (exact for
//!   consistent queries, tolerance-banded for the rest)
//! - Progress-driven or fixed-window session termination, chosen per run
//!
//! # CLI Usage
//!
//! ```bash
//! # Regenerate the baseline
//! query-regress update --host localhost --port 8899 --baseline tests/suite.json
//!
//! # Verify against it with a 20% band for non-deterministic queries
//! query-regress verify --tolerance 20 --baseline tests/suite.json
//!
//! # Services that emit no progress reports
//! query-regress --policy fixed-window --fixed-window 10s
//! ```

use clap::{Parser, ValueEnum};
use std::time::Duration;
use stream_session::SessionConfig;

pub mod cli;
pub mod config;
pub mod runner;
pub mod smoke;

pub use cli::Cli;
pub use runner::{Harness, RunReport, SessionFailure, SuiteRun, SuiteRunner};
pub use smoke::SmokeChecker;

use config::parse_duration_arg;

/// What a run does with its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Overwrite the baseline with the live counts
    Update,
    /// Compare the live counts with the baseline
    Verify,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Verify => write!(f, "verify"),
        }
    }
}

/// Session termination policy selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Close shortly after the analyzer reports it has processed everything
    Progress,
    /// Listen for a fixed window, then close
    FixedWindow,
}

#[derive(Parser, Clone, Debug)]
pub struct HarnessOpts {
    /// Analyzer host
    #[arg(long, default_value = "localhost", env = "REGRESS_HOST")]
    pub host: String,

    /// Analyzer port
    #[arg(long, default_value = "8899", env = "REGRESS_PORT")]
    pub port: u16,

    /// Path of the subscription WebSocket endpoint
    #[arg(long, default_value = "/ws")]
    pub ws_path: String,

    /// Path prefix of the record-fetch endpoint
    #[arg(long, default_value = "/entries")]
    pub entries_path: String,

    /// How each session decides its stream is finished
    #[arg(long, value_enum, default_value = "progress", env = "REGRESS_POLICY")]
    pub policy: PolicyKind,

    /// Delay between the completion signal and closing the channel
    #[arg(long, default_value = "10ms", value_parser = parse_duration_arg)]
    pub grace: Duration,

    /// Give up on a query that has not signalled completion after this long
    #[arg(long, default_value = "120s", value_parser = parse_duration_arg, env = "REGRESS_MAX_WAIT")]
    pub max_wait: Duration,

    /// Listening window per query under the fixed-window policy
    #[arg(long, default_value = "5s", value_parser = parse_duration_arg)]
    pub fixed_window: Duration,
}

impl HarnessOpts {
    /// Subscription channel URL, e.g. `ws://localhost:8899/ws`.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, normalize_path(&self.ws_path))
    }

    /// Record-fetch base URL, e.g. `http://localhost:8899/entries`.
    pub fn entries_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.host,
            self.port,
            normalize_path(&self.entries_path)
        )
    }

    pub fn session_config(&self) -> SessionConfig {
        match self.policy {
            PolicyKind::Progress => SessionConfig::progress(self.grace, self.max_wait),
            PolicyKind::FixedWindow => SessionConfig::fixed_window(self.fixed_window),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
