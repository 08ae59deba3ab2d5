//! Streaming session: one query, one subscription channel.
//!
//! The receive loop and the session timers are two branches of the same
//! `select!`, so a timer can end the session even when no message arrives.

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, warn};

use crate::{CompletionDetector, SessionConfig, SessionError, StreamEvent, TerminationPolicy};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The analyzer signalled completion and the grace period elapsed.
    Completed,
    /// The fixed listening window elapsed.
    WindowElapsed,
    /// The session ended without a trustworthy count.
    Failed(SessionError),
}

/// Result of streaming one query.
///
/// Identifiers collected before a failure are kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub ids: Vec<u64>,
    pub termination: Termination,
}

impl SessionOutcome {
    pub fn failed(ids: Vec<u64>, error: SessionError) -> Self {
        Self {
            ids,
            termination: Termination::Failed(error),
        }
    }

    pub fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.termination, Termination::Failed(_))
    }

    pub fn error(&self) -> Option<&SessionError> {
        match &self.termination {
            Termination::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Something that can stream the matches of one query.
#[async_trait]
pub trait QueryStream: Send + Sync {
    async fn stream_query(&self, query: &str) -> SessionOutcome;
}

/// WebSocket-backed session factory. Each call to `stream_query` opens a
/// fresh connection with its own accumulator.
#[derive(Debug, Clone)]
pub struct StreamingSession {
    url: String,
    config: SessionConfig,
}

impl StreamingSession {
    pub fn new(url: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            url: url.into(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[async_trait]
impl QueryStream for StreamingSession {
    async fn stream_query(&self, query: &str) -> SessionOutcome {
        let (ws_stream, _) = match connect_async(self.url.as_str()).await {
            Ok(connected) => connected,
            Err(e) => {
                return SessionOutcome::failed(
                    Vec::new(),
                    SessionError::Connect {
                        url: self.url.clone(),
                        reason: e.to_string(),
                    },
                );
            }
        };

        let (sink, mut frames) = ws_stream.split();
        let mut channel = CloseHandle::new(sink);

        if let Err(e) = channel.send_query(query).await {
            channel.close().await;
            return SessionOutcome::failed(Vec::new(), e);
        }

        let mut ids = Vec::new();
        let termination = collect_events(&mut frames, &self.config, &mut ids).await;
        channel.close().await;

        SessionOutcome { ids, termination }
    }
}

/// Write half of a subscription channel. Closing is idempotent.
pub struct CloseHandle<S> {
    sink: S,
    closed: bool,
}

impl<S> CloseHandle<S>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            closed: false,
        }
    }

    /// Send the raw query text as the subscription's only message.
    pub async fn send_query(&mut self, query: &str) -> Result<(), SessionError> {
        self.sink
            .send(Message::text(query.to_owned()))
            .await
            .map_err(|e| SessionError::Send(e.to_string()))
    }

    /// Close the channel. Returns `false` if it was already closed.
    pub async fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        if let Err(e) = self.sink.close().await {
            debug!("Error while closing subscription channel: {e}");
        }
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Drain frames into `ids` until the configured policy ends the session.
pub(crate) async fn collect_events<S, E>(
    frames: &mut S,
    config: &SessionConfig,
    ids: &mut Vec<u64>,
) -> Termination
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let started = Instant::now();
    let (grace, deadline) = match config.policy {
        TerminationPolicy::Progress { grace } => (Some(grace), started + config.max_wait),
        TerminationPolicy::FixedWindow { window } => (None, started + window),
    };

    let mut detector = CompletionDetector::new();
    let mut close_at: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;

            _ = sleep_until(close_at.unwrap_or(deadline)), if close_at.is_some() => {
                debug!("Grace period elapsed, {} entries collected", ids.len());
                return Termination::Completed;
            }

            // Once completion has fired only the grace timer may end the session.
            _ = sleep_until(deadline), if close_at.is_none() => {
                return match config.policy {
                    TerminationPolicy::FixedWindow { window } => {
                        debug!("Listening window of {window:?} elapsed, {} entries collected", ids.len());
                        Termination::WindowElapsed
                    }
                    TerminationPolicy::Progress { .. } => {
                        warn!("No completion signal after {:?}", config.max_wait);
                        Termination::Failed(SessionError::TimedOut(config.max_wait))
                    }
                };
            }

            frame = frames.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => StreamEvent::decode(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => StreamEvent::decode(text),
                        Err(e) => {
                            return Termination::Failed(SessionError::Protocol(format!(
                                "binary frame is not UTF-8: {e}"
                            )));
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        return ended(&detector, SessionError::ChannelClosed);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        return ended(&detector, SessionError::Transport(e.to_string()));
                    }
                };

                match event {
                    Ok(StreamEvent::Entry { id }) => ids.push(id),
                    Ok(StreamEvent::Progress { processed_so_far, total_known }) => {
                        debug!("Progress {processed_so_far}/{total_known}");
                        if let Some(grace) = grace {
                            if detector.observe(processed_so_far, total_known) {
                                debug!("Completion signalled, closing in {grace:?}");
                                close_at = Some(Instant::now() + grace);
                            }
                        }
                    }
                    Ok(StreamEvent::Unknown) => debug!("Ignoring message of unknown type"),
                    Err(e) => return Termination::Failed(SessionError::Protocol(e.to_string())),
                }
            }
        }
    }
}

/// The stream ended on its own; that is only fine after completion fired.
fn ended(detector: &CompletionDetector, error: SessionError) -> Termination {
    if detector.has_fired() {
        Termination::Completed
    } else {
        Termination::Failed(error)
    }
}
