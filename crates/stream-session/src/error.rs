//! Error types for streaming sessions.

use std::time::Duration;
use thiserror::Error;

/// Reasons a session ended without a trustworthy count.
///
/// All of these are scoped to the query that produced them; none aborts a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Could not open the subscription channel.
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Could not send the query.
    #[error("Failed to send query: {0}")]
    Send(String),

    /// The server sent a message that could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server closed the channel before signalling completion.
    #[error("Channel closed before completion")]
    ChannelClosed,

    /// The underlying transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No completion signal within the maximum wait.
    #[error("No completion signal after {0:?}")]
    TimedOut(Duration),
}
