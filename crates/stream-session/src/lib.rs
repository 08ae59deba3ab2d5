//! Streaming sessions against the analyzer's subscription channel.
//!
//! A session opens one WebSocket connection, sends one filter query, collects
//! the identifiers of matching records as they stream in, and decides when the
//! stream is finished.
//!
//! Two termination policies are supported, chosen per run:
//!
//! - [`TerminationPolicy::Progress`]: close a short grace period after the
//!   analyzer reports `leftOff == total` (with a non-zero total), bounded by a
//!   hard maximum wait.
//! - [`TerminationPolicy::FixedWindow`]: listen for a fixed duration and close,
//!   for query shapes that emit no progress reports.
//!
//! # Example
//!
//! ```ignore
//! use stream_session::{QueryStream, SessionConfig, StreamingSession};
//!
//! let session = StreamingSession::new("ws://localhost:8899/ws", SessionConfig::default());
//! let outcome = session.stream_query("http").await;
//! println!("{} records", outcome.count());
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod event;
pub mod session;

pub use config::{SessionConfig, TerminationPolicy};
pub use detector::CompletionDetector;
pub use error::SessionError;
pub use event::StreamEvent;
pub use session::{CloseHandle, QueryStream, SessionOutcome, StreamingSession, Termination};
