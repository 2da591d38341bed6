// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{METRIC_FLIGHT_DURATION, METRIC_IN_FLIGHT};
use crate::message::MessageId;
use crate::traits::{metric_context, MetricRelay, Timer};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Messages between dequeue and their terminal phase, each with a running
/// flight-duration timer.
///
/// A message id is tracked at most once: re-adding a tracked id keeps the
/// original timer. The `router-messages-in-flight` gauge is reported with
/// the table size on every add and remove, after the table lock is released.
pub struct InFlightTracker {
    timers: Mutex<HashMap<MessageId, Box<dyn Timer>>>,
    metrics: Arc<dyn MetricRelay>,
}

impl InFlightTracker {
    pub fn new(metrics: Arc<dyn MetricRelay>) -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    /// Start tracking `id`. Returns false if it was already tracked.
    pub async fn add(&self, id: &MessageId) -> bool {
        let (inserted, size) = {
            let mut timers = self.timers.lock().await;
            let inserted = if timers.contains_key(id) {
                false
            } else {
                let mut timer = self
                    .metrics
                    .timer(METRIC_FLIGHT_DURATION, Some(metric_context([("unit", "seconds")])));
                timer.start().await;
                timers.insert(id.clone(), timer);
                true
            };
            (inserted, timers.len())
        };
        self.report(size).await;
        inserted
    }

    /// Stop tracking `id` and stop its timer. Returns false if it was not tracked.
    pub async fn remove(&self, id: &MessageId) -> bool {
        let (timer, size) = {
            let mut timers = self.timers.lock().await;
            let timer = timers.remove(id);
            (timer, timers.len())
        };
        self.report(size).await;
        match timer {
            Some(mut timer) => {
                timer.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.timers.lock().await.len()
    }

    pub async fn contains(&self, id: &MessageId) -> bool {
        self.timers.lock().await.contains_key(id)
    }

    /// Report the current table size without changing it.
    pub async fn refresh(&self) {
        let size = self.len().await;
        self.report(size).await;
    }

    async fn report(&self, size: usize) {
        self.metrics.set(METRIC_IN_FLIGHT, size as f64, None).await;
    }
}
