//! Top-level command line of the `query-regress` binary.

use clap::Parser;
use regress_verify::VerifyArgs;
use std::path::PathBuf;

use crate::{HarnessOpts, RunMode};

#[derive(Parser, Debug)]
#[command(name = "query-regress")]
#[command(about = "Regression harness for a streaming query analyzer")]
#[command(long_about = None)]
pub struct Cli {
    /// Update the baseline or verify against it
    #[arg(value_enum, default_value = "verify")]
    pub mode: RunMode,

    #[command(flatten)]
    pub harness: HarnessOpts,

    #[command(flatten)]
    pub verify: VerifyArgs,

    /// Baseline file holding the expected record counts
    #[arg(long, default_value = "suite.json", env = "REGRESS_BASELINE")]
    pub baseline: PathBuf,

    /// YAML query catalog to run instead of the built-in one
    #[arg(long)]
    pub queries: Option<PathBuf>,
}
