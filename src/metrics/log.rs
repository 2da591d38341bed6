// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Metric relay that writes every metric to the application log.
//!
//! This is the default relay when no other provider is configured.
//! Counters are cumulative per metric name; each update logs the running
//! total as `[name] value: v context: {...}`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use tracing::Level;

use crate::traits::{MetricContext, MetricRelay, Timer};

const METRICS_TARGET: &str = "gordon::metrics";

fn emit(level: Level, line: &str) {
    match level {
        Level::TRACE => tracing::trace!(target: METRICS_TARGET, "{}", line),
        Level::DEBUG => tracing::debug!(target: METRICS_TARGET, "{}", line),
        Level::INFO => tracing::info!(target: METRICS_TARGET, "{}", line),
        Level::WARN => tracing::warn!(target: METRICS_TARGET, "{}", line),
        Level::ERROR => tracing::error!(target: METRICS_TARGET, "{}", line),
    }
}

/// Render a metric line the way operators grep for it.
pub fn format_metric(name: &str, value: f64, context: Option<&MetricContext>) -> String {
    let mut line = format!("[{}] value: {}", name, value);
    if let Some(ctx) = context.filter(|c| !c.is_empty()) {
        line.push_str(&format!(" context: {:?}", ctx));
    }
    line
}

pub struct LogRelay {
    level: Level,
    time_unit: f64,
    counters: Mutex<HashMap<String, u64>>,
}

impl LogRelay {
    pub fn new(level: Level, time_unit: f64) -> Self {
        Self {
            level,
            time_unit,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Current cumulative value of a counter.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .map(|c| c.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Default for LogRelay {
    fn default() -> Self {
        Self::new(Level::INFO, 1.0)
    }
}

#[async_trait]
impl MetricRelay for LogRelay {
    async fn incr(&self, name: &str, value: u64, context: Option<MetricContext>) {
        let total = match self.counters.lock() {
            Ok(mut counters) => {
                let entry = counters.entry(name.to_string()).or_insert(0);
                *entry += value;
                *entry
            }
            // a poisoned lock only loses the running total, not the event
            Err(_) => value,
        };
        self.set(name, total as f64, context).await;
    }

    async fn set(&self, name: &str, value: f64, context: Option<MetricContext>) {
        emit(self.level, &format_metric(name, value, context.as_ref()));
    }

    fn timer(&self, name: &str, context: Option<MetricContext>) -> Box<dyn Timer> {
        Box::new(LogTimer {
            name: name.to_string(),
            context,
            level: self.level,
            time_unit: self.time_unit,
            started: None,
        })
    }
}

/// Timer that logs its elapsed time, scaled by `time_unit`, when stopped.
pub struct LogTimer {
    name: String,
    context: Option<MetricContext>,
    level: Level,
    time_unit: f64,
    started: Option<Instant>,
}

#[async_trait]
impl Timer for LogTimer {
    async fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    async fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            let elapsed = started.elapsed().as_secs_f64() * self.time_unit;
            emit(self.level, &format_metric(&self.name, elapsed, self.context.as_ref()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{metric_context, time_scope};

    #[tokio::test]
    async fn test_counters_are_cumulative() {
        let relay = LogRelay::default();

        relay.incr("router-message-consumed", 1, None).await;
        relay.incr("router-message-consumed", 2, None).await;
        relay.incr("router-message-completed", 1, None).await;

        assert_eq!(relay.counter("router-message-consumed"), 3);
        assert_eq!(relay.counter("router-message-completed"), 1);
        assert_eq!(relay.counter("never-touched"), 0);
    }

    #[test]
    fn test_format_metric_without_context() {
        assert_eq!(format_metric("gauge", 2.0, None), "[gauge] value: 2");
        assert_eq!(format_metric("gauge", 2.0, Some(&MetricContext::new())), "[gauge] value: 2");
    }

    #[test]
    fn test_format_metric_with_context() {
        let ctx = metric_context([("error", "Timeout")]);
        assert_eq!(
            format_metric("router-message-dropped", 1.0, Some(&ctx)),
            "[router-message-dropped] value: 1 context: {\"error\": \"Timeout\"}"
        );
    }

    #[tokio::test]
    async fn test_timer_stop_without_start_is_noop() {
        let relay = LogRelay::default();
        let mut timer = relay.timer("t", None);
        timer.stop().await;
    }

    #[tokio::test]
    async fn test_time_scope_returns_inner_output() {
        let relay = LogRelay::new(Level::DEBUG, 1000.0);
        let mut timer = relay.timer("scoped", None);

        let result: Result<u8, &str> = time_scope(timer.as_mut(), async { Err("boom") }).await;

        assert_eq!(result, Err("boom"));
    }
}
