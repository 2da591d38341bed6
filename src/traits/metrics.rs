// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Metric relay contract: counters, gauges and timers.
//!
//! The router only talks to this trait; concrete backends live in
//! [`crate::metrics`].

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;

/// Key-value pairs further describing a metric, e.g. `{"error": "Timeout"}`.
pub type MetricContext = BTreeMap<String, String>;

/// Build a [`MetricContext`] from string pairs.
pub fn metric_context<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> MetricContext {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait]
pub trait MetricRelay: Send + Sync {
    /// Increase the counter `name` by `value`.
    async fn incr(&self, name: &str, value: u64, context: Option<MetricContext>);

    /// Report the current value of the gauge `name`.
    async fn set(&self, name: &str, value: f64, context: Option<MetricContext>);

    /// Create an unstarted timer for `name`.
    fn timer(&self, name: &str, context: Option<MetricContext>) -> Box<dyn Timer>;

    /// Flush or release backend resources.
    async fn cleanup(&self) {}
}

#[async_trait]
pub trait Timer: Send + Sync {
    async fn start(&mut self);

    /// Stop the timer and report the elapsed time.
    async fn stop(&mut self);
}

/// Time a future: start on entry, stop on exit.
///
/// The output of `fut` is returned untouched, so a future resolving to an
/// `Err` still stops the timer.
pub async fn time_scope<F, T>(timer: &mut dyn Timer, fut: F) -> T
where
    F: Future<Output = T>,
{
    timer.start().await;
    let output = fut.await;
    timer.stop().await;
    output
}
