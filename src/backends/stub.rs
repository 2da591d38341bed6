// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::queue::SuccessSender;
use crate::errors::{HandlerError, PluginError};
use crate::message::{EventMessage, MessageId, Phase};
use crate::traits::{MessageHandler, MetricContext, MetricRelay, Runnable, Timer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricCall {
    Incr {
        name: String,
        value: u64,
        context: MetricContext,
    },
    Set {
        name: String,
        value: f64,
    },
    TimerCreated {
        name: String,
        context: MetricContext,
    },
    TimerStarted(String),
    TimerStopped(String),
}

/// A metric relay that records every call for later assertions
#[derive(Default)]
pub struct RecordingRelay {
    calls: Arc<Mutex<Vec<MetricCall>>>,
}

impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MetricCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Sum of all increments of `name`.
    pub fn counter_total(&self, name: &str) -> u64 {
        self.counter_contexts(name).len() as u64
    }

    /// Context of every increment of `name`, in call order.
    pub fn counter_contexts(&self, name: &str) -> Vec<MetricContext> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MetricCall::Incr {
                    name: n,
                    value,
                    context,
                } if n == name => Some(std::iter::repeat(context).take(value as usize)),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn gauge_values(&self, name: &str) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MetricCall::Set { name: n, value } if n == name => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn timer_contexts(&self, name: &str) -> Vec<MetricContext> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MetricCall::TimerCreated { name: n, context } if n == name => Some(context),
                _ => None,
            })
            .collect()
    }

    pub fn timers_started(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MetricCall::TimerStarted(n) if n == name))
            .count()
    }

    pub fn timers_stopped(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MetricCall::TimerStopped(n) if n == name))
            .count()
    }

    fn record(&self, call: MetricCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MetricRelay for RecordingRelay {
    async fn incr(&self, name: &str, value: u64, context: Option<MetricContext>) {
        self.record(MetricCall::Incr {
            name: name.to_string(),
            value,
            context: context.unwrap_or_default(),
        });
    }

    async fn set(&self, name: &str, value: f64, _context: Option<MetricContext>) {
        self.record(MetricCall::Set {
            name: name.to_string(),
            value,
        });
    }

    fn timer(&self, name: &str, context: Option<MetricContext>) -> Box<dyn Timer> {
        self.record(MetricCall::TimerCreated {
            name: name.to_string(),
            context: context.unwrap_or_default(),
        });
        Box::new(RecordingTimer {
            name: name.to_string(),
            calls: Arc::clone(&self.calls),
        })
    }
}

struct RecordingTimer {
    name: String,
    calls: Arc<Mutex<Vec<MetricCall>>>,
}

#[async_trait]
impl Timer for RecordingTimer {
    async fn start(&mut self) {
        self.calls
            .lock()
            .unwrap()
            .push(MetricCall::TimerStarted(self.name.clone()));
    }

    async fn stop(&mut self) {
        self.calls
            .lock()
            .unwrap()
            .push(MetricCall::TimerStopped(self.name.clone()));
    }
}

/// A handler that succeeds and records every message it sees
pub struct StubHandler {
    name: String,
    phase: Phase,
    delay: Option<Duration>,
    seen: Mutex<Vec<(MessageId, Phase)>>,
}

impl StubHandler {
    pub fn new(name: &str, phase: &str) -> Self {
        Self {
            name: name.to_string(),
            phase: Phase::from(phase),
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before returning, to keep messages in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// (message id, phase at call time) for every call
    pub fn seen(&self) -> Vec<(MessageId, Phase)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageHandler for StubHandler {
    fn phase(&self) -> Phase {
        self.phase.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_message(&self, msg: &mut EventMessage) -> Result<(), HandlerError> {
        self.seen
            .lock()
            .unwrap()
            .push((msg.id().clone(), msg.phase().clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

/// A handler that always fails with `InvalidMessage`
pub struct FailingHandler {
    name: String,
    phase: Phase,
    calls: AtomicUsize,
}

impl FailingHandler {
    pub fn new(name: &str, phase: &str) -> Self {
        Self {
            name: name.to_string(),
            phase: Phase::from(phase),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageHandler for FailingHandler {
    fn phase(&self) -> Phase {
        self.phase.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_message(&self, _msg: &mut EventMessage) -> Result<(), HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(HandlerError::InvalidMessage(format!(
            "simulated failure in {}",
            self.name
        )))
    }
}

/// A handler that never returns, for timeout tests
pub struct HangingHandler {
    phase: Phase,
}

impl HangingHandler {
    pub fn new(phase: &str) -> Self {
        Self {
            phase: Phase::from(phase),
        }
    }
}

#[async_trait]
impl MessageHandler for HangingHandler {
    fn phase(&self) -> Phase {
        self.phase.clone()
    }

    fn name(&self) -> &str {
        "hanging"
    }

    async fn handle_message(&self, _msg: &mut EventMessage) -> Result<(), HandlerError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// A runnable that enqueues a fixed batch of messages, optionally
/// followed by the shutdown sentinel
pub struct BatchRunnable {
    sender: SuccessSender,
    messages: Mutex<Vec<EventMessage>>,
    send_shutdown: bool,
    shutdown_calls: AtomicUsize,
}

impl BatchRunnable {
    pub fn new(sender: SuccessSender, messages: Vec<EventMessage>, send_shutdown: bool) -> Self {
        Self {
            sender,
            messages: Mutex::new(messages),
            send_shutdown,
            shutdown_calls: AtomicUsize::new(0),
        }
    }

    pub fn shutdown_calls(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Runnable for BatchRunnable {
    fn name(&self) -> &str {
        "batch"
    }

    async fn run(&self) -> Result<(), PluginError> {
        let messages: Vec<EventMessage> = self.messages.lock().unwrap().drain(..).collect();
        for msg in messages {
            self.sender
                .send(msg)
                .map_err(|_| PluginError::QueueClosed(self.name().to_string()))?;
        }
        if self.send_shutdown {
            self.sender.shutdown();
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), PluginError> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
