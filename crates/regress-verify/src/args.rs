//! CLI argument definitions for baseline verification.

use clap::Args;

/// Arguments controlling how a live run is checked against the baseline.
#[derive(Args, Clone, Debug)]
pub struct VerifyArgs {
    /// Accepted deviation, in percent, for queries not marked consistent
    #[arg(long, default_value = "10", env = "REGRESS_TOLERANCE")]
    pub tolerance: f64,

    /// Skip fetching the first query's records over HTTP
    #[arg(long)]
    pub skip_smoke: bool,

    /// Number of record fetches in flight during the smoke check
    #[arg(long, default_value = "4")]
    pub smoke_concurrency: usize,
}

impl Default for VerifyArgs {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            skip_smoke: false,
            smoke_concurrency: 4,
        }
    }
}
