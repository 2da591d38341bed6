// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for router lifecycle and message routing events.
//!
//! This module contains message types for logging events related to:
//! * Router startup and shutdown
//! * Phase transitions and unknown phases
//! * Handler failures and failure diversion
//! * Messages dropped before or after dispatch

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Router started polling the success queue.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use gordon::observability::messages::router::RouterStarted;
/// use std::time::Duration;
///
/// let msg = RouterStarted {
///     handler_count: 3,
///     poll_interval: Duration::from_millis(100),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RouterStarted {
    pub handler_count: usize,
    pub poll_interval: Duration,
}

impl Display for RouterStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting message router: {} handlers, poll_interval={:?}",
            self.handler_count, self.poll_interval
        )
    }
}

impl StructuredLog for RouterStarted {
    fn log(&self) {
        tracing::info!(
            handler_count = self.handler_count,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "router",
            span_name = name,
            handler_count = self.handler_count,
        )
    }
}

/// Router stopped polling.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RouterStopped<'a> {
    pub reason: &'a str,
    pub messages_consumed: u64,
}

impl Display for RouterStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message router stopped ({}) after consuming {} messages",
            self.reason, self.messages_consumed
        )
    }
}

impl StructuredLog for RouterStopped<'_> {
    fn log(&self) {
        tracing::info!(
            reason = self.reason,
            messages_consumed = self.messages_consumed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("router_stopped", span_name = name, reason = self.reason)
    }
}

/// Shutdown sentinel received on the success queue.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ShutdownReceived;

impl Display for ShutdownReceived {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Received shutdown signal, shutting down router...")
    }
}

impl StructuredLog for ShutdownReceived {
    fn log(&self) {
        tracing::info!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("router_shutdown", span_name = name)
    }
}

/// Message routed to its next phase.
///
/// # Log Level
/// `debug!` - Routine per-message detail
///
/// # Example
/// ```
/// use gordon::observability::messages::router::PhaseRouted;
///
/// let msg = PhaseRouted {
///     message_id: "01HZX3",
///     current: "consume",
///     next: "enrich",
/// };
///
/// assert_eq!(msg.to_string(), "Routing message 01HZX3 from phase \"consume\" to phase \"enrich\"");
/// ```
pub struct PhaseRouted<'a> {
    pub message_id: &'a str,
    pub current: &'a str,
    pub next: &'a str,
}

impl Display for PhaseRouted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Routing message {} from phase \"{}\" to phase \"{}\"",
            self.message_id, self.current, self.next
        )
    }
}

impl StructuredLog for PhaseRouted<'_> {
    fn log(&self) {
        tracing::debug!(
            message_id = self.message_id,
            current = self.current,
            next = self.next,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dispatch",
            span_name = name,
            message_id = self.message_id,
            phase = self.next,
        )
    }
}

/// Message carries a phase with no route entry.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnknownPhase<'a> {
    pub message_id: &'a str,
    pub phase: &'a str,
    pub fallback: &'a str,
}

impl Display for UnknownPhase<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message {} has an unknown phase: \"{}\". Routing to \"{}\"",
            self.message_id, self.phase, self.fallback
        )
    }
}

impl StructuredLog for UnknownPhase<'_> {
    fn log(&self) {
        tracing::error!(
            message_id = self.message_id,
            phase = self.phase,
            fallback = self.fallback,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unknown_phase",
            span_name = name,
            message_id = self.message_id,
            phase = self.phase,
        )
    }
}

/// Handler returned an error; the message is diverted to cleanup.
///
/// # Log Level
/// `warn!` - Recovered failure
///
/// # Example
/// ```
/// use gordon::observability::messages::router::HandlerFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "dns api down");
/// let msg = HandlerFailed {
///     message_id: "01HZX3",
///     phase: "publish",
///     handler: "log_publisher",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct HandlerFailed<'a> {
    pub message_id: &'a str,
    pub phase: &'a str,
    pub handler: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for HandlerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropping message {} in phase \"{}\" due to error from '{}': {}",
            self.message_id, self.phase, self.handler, self.error
        )
    }
}

impl StructuredLog for HandlerFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            message_id = self.message_id,
            phase = self.phase,
            handler = self.handler,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "handler_failed",
            span_name = name,
            message_id = self.message_id,
            phase = self.phase,
            error = %self.error,
        )
    }
}

/// Message reached a terminal phase that has no handler.
///
/// # Log Level
/// `warn!` - Message discarded without cleanup
pub struct MessageDiscarded<'a> {
    pub message_id: &'a str,
    pub phase: &'a str,
}

impl Display for MessageDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No handler registered for terminal phase \"{}\", discarding message {}",
            self.phase, self.message_id
        )
    }
}

impl StructuredLog for MessageDiscarded<'_> {
    fn log(&self) {
        tracing::warn!(
            message_id = self.message_id,
            phase = self.phase,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "message_discarded",
            span_name = name,
            message_id = self.message_id,
        )
    }
}

/// No handler covers the phase messages are diverted to.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct MissingTerminalHandler<'a> {
    pub phase: &'a str,
}

impl Display for MissingTerminalHandler<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No handler registered for terminal phase \"{}\"; messages reaching it will be discarded",
            self.phase
        )
    }
}

impl StructuredLog for MissingTerminalHandler<'_> {
    fn log(&self) {
        tracing::warn!(phase = self.phase, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("missing_terminal_handler", span_name = name, phase = self.phase)
    }
}

/// Dequeued message failed validation and was dropped.
///
/// # Log Level
/// `warn!` - Message discarded
pub struct InvalidMessageDropped<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for InvalidMessageDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring invalid message: {}", self.error)
    }
}

impl StructuredLog for InvalidMessageDropped<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("invalid_message", span_name = name, error = %self.error)
    }
}

/// Success queue closed while a message was being requeued.
///
/// # Log Level
/// `error!` - Message lost
pub struct RequeueFailed<'a> {
    pub message_id: &'a str,
    pub phase: &'a str,
}

impl Display for RequeueFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Success queue closed, message {} stranded before phase \"{}\"",
            self.message_id, self.phase
        )
    }
}

impl StructuredLog for RequeueFailed<'_> {
    fn log(&self) {
        tracing::error!(
            message_id = self.message_id,
            phase = self.phase,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("requeue_failed", span_name = name, message_id = self.message_id)
    }
}

/// A poll task ended abnormally, typically a handler panic.
///
/// # Log Level
/// `error!` - The message being dispatched is lost
pub struct PollTaskFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for PollTaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Router poll task failed: {}", self.error)
    }
}

impl StructuredLog for PollTaskFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("poll_task_failed", span_name = name)
    }
}
