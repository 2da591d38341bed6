// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Phase-driven message router.
//!
//! The router consumes [`EventMessage`]s from the success queue, advances
//! each one to its next phase, invokes the handler registered for that phase
//! and puts the message back on the queue until it reaches a terminal phase.
//!
//! # Dispatch
//!
//! 1. Pick the next phase: the diversion phase when forced, otherwise the
//!    route's successor of the current phase (unknown phases fall back to
//!    the diversion phase)
//! 2. Count the transition and set the message's phase *before* the handler
//!    runs, so a failure is attributed to the phase being attempted
//! 3. Invoke the handler
//!    - success on a non-terminal phase re-enqueues the message
//!    - success on a terminal phase completes it (unless it was forced there)
//!    - failure records the error and diverts the message to the diversion
//!      phase, once; a failure in a terminal phase ends the message
//!
//! Handler failures never escape [`Router::route`] and never stop the loop.
//!
//! # Scheduling
//!
//! [`Router::run`] repeatedly spawns a non-blocking poll of the queue and
//! waits for a poll to finish, bounded by the poll interval. A slow handler
//! therefore does not stall dispatch of the next message: messages start in
//! queue order but may finish in any order.

use crate::config::consts::{
    INVALID_MESSAGE_PROVIDER, METRIC_COMPLETED, METRIC_CONSUMED, METRIC_DISCARDED, METRIC_DROPPED,
    METRIC_PHASE_UPDATE,
};
use crate::config::{PhasePluginMap, PhaseRoute, RouterConfig};
use crate::engine::in_flight::InFlightTracker;
use crate::engine::queue::{SuccessReceiver, SuccessSender, TryRecv};
use crate::errors::{HandlerError, MessageError, RouterError};
use crate::message::{EventMessage, MessageId, Phase};
use crate::observability::messages::router::{
    HandlerFailed, InvalidMessageDropped, MessageDiscarded, MissingTerminalHandler, PhaseRouted,
    PollTaskFailed, RequeueFailed, RouterStarted, RouterStopped, ShutdownReceived, UnknownPhase,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{metric_context, MessageHandler, MetricRelay};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Upper bound on how long `run` waits for a single poll
    pub poll_interval: Duration,
    /// Per-handler time limit; exceeding it counts as a handler failure
    pub handler_timeout: Option<Duration>,
    /// Runtime poll tasks are spawned on; the ambient runtime when `None`
    pub runtime: Option<Handle>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

impl RouterOptions {
    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            handler_timeout: config.handler_timeout(),
            runtime: None,
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

/// What happened to a message after one `route` call.
#[derive(Debug)]
pub enum Disposition {
    /// Handled and put back on the queue for its next phase.
    Requeued { id: MessageId, phase: Phase },
    /// Reached a terminal phase through the normal chain.
    Completed(EventMessage),
    /// A handler failed; the message was diverted and its lifecycle ended.
    Dropped(EventMessage),
    /// Reached a terminal phase that has no handler.
    Discarded(EventMessage),
    /// Failed validation before any phase logic ran.
    Rejected(EventMessage),
    /// Handled, but the queue was closed before it could be re-enqueued.
    Stranded { id: MessageId, phase: Phase },
}

impl Disposition {
    /// True when the router is finished with the message.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Disposition::Requeued { .. })
    }

    pub fn phase(&self) -> &Phase {
        match self {
            Disposition::Requeued { phase, .. } | Disposition::Stranded { phase, .. } => phase,
            Disposition::Completed(msg)
            | Disposition::Dropped(msg)
            | Disposition::Discarded(msg)
            | Disposition::Rejected(msg) => msg.phase(),
        }
    }

    /// The message itself, when the router still holds it.
    pub fn message(&self) -> Option<&EventMessage> {
        match self {
            Disposition::Completed(msg)
            | Disposition::Dropped(msg)
            | Disposition::Discarded(msg)
            | Disposition::Rejected(msg) => Some(msg),
            Disposition::Requeued { .. } | Disposition::Stranded { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum PollOutcome {
    /// Nothing was waiting on the queue.
    Empty,
    /// The shutdown sentinel was seen, now or by an earlier poll.
    Shutdown,
    Routed(Disposition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    Cancelled,
}

impl StopReason {
    fn as_str(&self) -> &'static str {
        match self {
            StopReason::Shutdown => "shutdown",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// Totals since the router was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub consumed: u64,
    pub completed: u64,
    pub dropped: u64,
    pub discarded: u64,
    pub rejected: u64,
    pub stop_reason: Option<StopReason>,
}

#[derive(Default)]
struct Counters {
    consumed: AtomicU64,
    completed: AtomicU64,
    dropped: AtomicU64,
    discarded: AtomicU64,
    rejected: AtomicU64,
}

pub struct Router {
    route: PhaseRoute,
    handlers: PhasePluginMap,
    sender: SuccessSender,
    receiver: Mutex<SuccessReceiver>,
    metrics: Arc<dyn MetricRelay>,
    in_flight: InFlightTracker,
    options: RouterOptions,
    stopping: AtomicBool,
    counters: Counters,
}

impl Router {
    /// Build a router over `handlers`, keyed by their declared phases.
    ///
    /// Fails if two handlers declare the same phase. A terminal phase with
    /// no handler is allowed but logged, since messages reaching it are
    /// discarded.
    pub fn new(
        route: PhaseRoute,
        sender: SuccessSender,
        receiver: SuccessReceiver,
        handlers: Vec<Arc<dyn MessageHandler>>,
        metrics: Arc<dyn MetricRelay>,
        options: RouterOptions,
    ) -> Result<Self, RouterError> {
        let handlers = PhasePluginMap::from_handlers(handlers)?;

        for terminal in route.terminal_phases() {
            if !handlers.contains(terminal) {
                MissingTerminalHandler {
                    phase: terminal.as_str(),
                }
                .log();
            }
        }

        Ok(Self {
            route,
            handlers,
            sender,
            receiver: Mutex::new(receiver),
            in_flight: InFlightTracker::new(Arc::clone(&metrics)),
            metrics,
            options,
            stopping: AtomicBool::new(false),
            counters: Counters::default(),
        })
    }

    /// A handle producers can use to feed this router.
    pub fn sender(&self) -> SuccessSender {
        self.sender.clone()
    }

    pub fn route_table(&self) -> &PhaseRoute {
        &self.route
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            consumed: self.counters.consumed.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            dropped: self.counters.dropped.load(Ordering::SeqCst),
            discarded: self.counters.discarded.load(Ordering::SeqCst),
            rejected: self.counters.rejected.load(Ordering::SeqCst),
            stop_reason: None,
        }
    }

    /// Phase that follows the message's current phase.
    ///
    /// An unknown phase is logged as an error and answered with the
    /// diversion phase, so unroutable messages end up in cleanup.
    pub fn get_next_phase(&self, msg: &EventMessage) -> Phase {
        match self.route.get(msg.phase()) {
            Some(next) => {
                PhaseRouted {
                    message_id: msg.id().as_str(),
                    current: msg.phase().as_str(),
                    next: next.as_str(),
                }
                .log();
                next.clone()
            }
            None => {
                let fallback = self.route.diversion_phase();
                UnknownPhase {
                    message_id: msg.id().as_str(),
                    phase: msg.phase().as_str(),
                    fallback: fallback.as_str(),
                }
                .log();
                fallback.clone()
            }
        }
    }

    /// Dispatch a message to its next phase.
    ///
    /// With `force_cleanup` the message goes straight to the diversion
    /// phase. A handler failure in a non-terminal phase diverts the message
    /// once; a failure in a terminal phase ends it.
    pub async fn route(&self, mut msg: EventMessage, force_cleanup: bool) -> Disposition {
        if let Err(error) = msg.validate() {
            return self.reject(msg, &error).await;
        }

        let mut forced = force_cleanup;
        let mut failed = false;
        loop {
            let next = if forced {
                self.route.diversion_phase().clone()
            } else {
                self.get_next_phase(&msg)
            };

            self.metrics
                .incr(
                    METRIC_PHASE_UPDATE,
                    1,
                    Some(metric_context([
                        ("current", msg.phase().as_str()),
                        ("next", next.as_str()),
                    ])),
                )
                .await;
            msg.update_phase(next.clone());
            let terminal = self.route.is_terminal(&next);

            let Some(handler) = self.handlers.get(&next).cloned() else {
                if terminal {
                    return self.discard(msg).await;
                }
                let error = HandlerError::Unavailable(format!(
                    "no handler registered for phase '{}'",
                    next
                ));
                self.record_failure(&mut msg, "none", &error, !failed).await;
                failed = true;
                forced = true;
                continue;
            };

            match self.invoke(handler.as_ref(), &mut msg).await {
                Ok(()) => {
                    msg.append_to_history(
                        format!("Handled by '{}' in phase '{}'", handler.name(), next),
                        &next,
                    );
                    if !terminal {
                        return self.requeue(msg);
                    }
                    if forced {
                        return Disposition::Dropped(msg);
                    }
                    self.metrics.incr(METRIC_COMPLETED, 1, None).await;
                    self.counters.completed.fetch_add(1, Ordering::SeqCst);
                    return Disposition::Completed(msg);
                }
                Err(error) => {
                    self.record_failure(&mut msg, handler.name(), &error, !failed)
                        .await;
                    if terminal {
                        return Disposition::Dropped(msg);
                    }
                    failed = true;
                    forced = true;
                }
            }
        }
    }

    async fn reject(&self, msg: EventMessage, error: &MessageError) -> Disposition {
        InvalidMessageDropped { error }.log();
        self.metrics
            .incr(
                METRIC_DROPPED,
                1,
                Some(metric_context([("error", INVALID_MESSAGE_PROVIDER)])),
            )
            .await;
        self.counters.rejected.fetch_add(1, Ordering::SeqCst);
        Disposition::Rejected(msg)
    }

    /// Append the failure to the message history and log it. Only the first
    /// failure of a message is counted as a drop.
    async fn record_failure(
        &self,
        msg: &mut EventMessage,
        handler: &str,
        error: &HandlerError,
        count_drop: bool,
    ) {
        let phase = msg.phase().clone();
        msg.append_to_history(
            format!("Dropping message in phase '{}' due to error: {}", phase, error),
            &phase,
        );
        HandlerFailed {
            message_id: msg.id().as_str(),
            phase: phase.as_str(),
            handler,
            error,
        }
        .log();

        if count_drop {
            self.metrics
                .incr(METRIC_DROPPED, 1, Some(metric_context([("error", error.kind())])))
                .await;
            self.counters.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn invoke(
        &self,
        handler: &dyn MessageHandler,
        msg: &mut EventMessage,
    ) -> Result<(), HandlerError> {
        match self.options.handler_timeout {
            Some(limit) => tokio::time::timeout(limit, handler.handle_message(msg))
                .await
                .unwrap_or(Err(HandlerError::Timeout(limit))),
            None => handler.handle_message(msg).await,
        }
    }

    async fn discard(&self, msg: EventMessage) -> Disposition {
        MessageDiscarded {
            message_id: msg.id().as_str(),
            phase: msg.phase().as_str(),
        }
        .log();
        self.metrics
            .incr(
                METRIC_DISCARDED,
                1,
                Some(metric_context([("phase", msg.phase().as_str())])),
            )
            .await;
        self.counters.discarded.fetch_add(1, Ordering::SeqCst);
        Disposition::Discarded(msg)
    }

    fn requeue(&self, msg: EventMessage) -> Disposition {
        let id = msg.id().clone();
        let phase = msg.phase().clone();
        match self.sender.send(msg) {
            Ok(()) => Disposition::Requeued { id, phase },
            Err(_) => {
                RequeueFailed {
                    message_id: id.as_str(),
                    phase: phase.as_str(),
                }
                .log();
                Disposition::Stranded { id, phase }
            }
        }
    }

    /// Take at most one item off the success queue without waiting.
    ///
    /// Once the shutdown sentinel has been seen every later poll returns
    /// [`PollOutcome::Shutdown`] without reading; messages still queued are
    /// left where they are. A message that fails validation is rejected
    /// here, before it is counted as consumed or tracked in flight.
    pub async fn poll_channel(&self) -> PollOutcome {
        if self.is_stopping() {
            return PollOutcome::Shutdown;
        }

        let received = self.receiver.lock().await.try_recv();
        match received {
            TryRecv::Empty => PollOutcome::Empty,
            TryRecv::Shutdown | TryRecv::Closed => {
                if !self.stopping.swap(true, Ordering::SeqCst) {
                    ShutdownReceived.log();
                }
                PollOutcome::Shutdown
            }
            TryRecv::Message(msg) => {
                if let Err(error) = msg.validate() {
                    return PollOutcome::Routed(self.reject(msg, &error).await);
                }
                self.counters.consumed.fetch_add(1, Ordering::SeqCst);
                self.metrics.incr(METRIC_CONSUMED, 1, None).await;

                let id = msg.id().clone();
                self.in_flight.add(&id).await;
                let disposition = self.route(msg, false).await;
                if disposition.is_settled() {
                    self.in_flight.remove(&id).await;
                } else {
                    self.in_flight.refresh().await;
                }
                PollOutcome::Routed(disposition)
            }
        }
    }

    /// Poll the success queue until the shutdown sentinel arrives or
    /// `cancel` fires.
    ///
    /// Polls already running when the sentinel arrives are allowed to
    /// finish. On cancellation they are aborted, and any message they were
    /// dispatching stays in the in-flight table.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) -> RouterStats {
        RouterStarted {
            handler_count: self.handlers.len(),
            poll_interval: self.options.poll_interval,
        }
        .log();

        let interval = self.options.poll_interval;
        let mut polls: JoinSet<PollOutcome> = JoinSet::new();

        let reason = loop {
            if self.is_stopping() {
                break StopReason::Shutdown;
            }
            self.spawn_poll(&mut polls);

            let waited = tokio::select! {
                _ = cancel.cancelled() => break StopReason::Cancelled,
                waited = tokio::time::timeout(interval, polls.join_next()) => waited,
            };

            let mut finished = Vec::new();
            let timed_out = match waited {
                Ok(Some(joined)) => {
                    finished.push(joined);
                    false
                }
                Ok(None) => false,
                Err(_) => true,
            };
            while let Some(joined) = polls.try_join_next() {
                finished.push(joined);
            }

            let mut idle = !timed_out;
            for joined in finished {
                match joined {
                    Ok(PollOutcome::Empty) => {}
                    Ok(_) => idle = false,
                    Err(error) => {
                        PollTaskFailed { error: &error }.log();
                        idle = false;
                    }
                }
            }

            if idle {
                tokio::select! {
                    _ = cancel.cancelled() => break StopReason::Cancelled,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        };

        match reason {
            StopReason::Shutdown => loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        polls.abort_all();
                        break;
                    }
                    joined = polls.join_next() => match joined {
                        Some(Err(error)) if !error.is_cancelled() => {
                            PollTaskFailed { error: &error }.log();
                        }
                        Some(_) => {}
                        None => break,
                    },
                }
            },
            StopReason::Cancelled => polls.abort_all(),
        }

        let mut stats = self.stats();
        stats.stop_reason = Some(reason);
        RouterStopped {
            reason: reason.as_str(),
            messages_consumed: stats.consumed,
        }
        .log();
        stats
    }

    fn spawn_poll(self: &Arc<Self>, polls: &mut JoinSet<PollOutcome>) {
        let router = Arc::clone(self);
        let poll = async move { router.poll_channel().await };
        match &self.options.runtime {
            Some(handle) => {
                polls.spawn_on(poll, handle);
            }
            None => {
                polls.spawn(poll);
            }
        }
    }
}
