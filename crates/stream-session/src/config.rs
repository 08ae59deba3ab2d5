//! Session termination configuration.

use std::time::Duration;

/// Grace period between the completion signal and closing the channel.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(10);

/// Hard deadline for a progress-driven session.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(120);

/// Listening window for a fixed-window session.
pub const DEFAULT_FIXED_WINDOW: Duration = Duration::from_secs(5);

/// How a session decides its stream is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationPolicy {
    /// Close `grace` after the analyzer reports it has processed everything.
    Progress { grace: Duration },
    /// Ignore progress reports; listen for `window`, then close.
    FixedWindow { window: Duration },
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::Progress {
            grace: DEFAULT_GRACE,
        }
    }
}

/// Per-run session settings. Applies to every query of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub policy: TerminationPolicy,
    /// Upper bound on a progress-driven session. Not used by `FixedWindow`,
    /// whose window is itself the bound.
    pub max_wait: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            policy: TerminationPolicy::default(),
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl SessionConfig {
    pub fn progress(grace: Duration, max_wait: Duration) -> Self {
        Self {
            policy: TerminationPolicy::Progress { grace },
            max_wait,
        }
    }

    pub fn fixed_window(window: Duration) -> Self {
        Self {
            policy: TerminationPolicy::FixedWindow { window },
            max_wait: window,
        }
    }
}
