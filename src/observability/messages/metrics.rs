// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for metric backend failures.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A metric could not be delivered to its backend.
///
/// # Log Level
/// `warn!` - Metrics are best effort
pub struct MetricSendFailed<'a> {
    pub metric: &'a str,
    pub destination: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MetricSendFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to send metric '{}' to {}: {}",
            self.metric, self.destination, self.error
        )
    }
}

impl StructuredLog for MetricSendFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            metric = self.metric,
            destination = self.destination,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("metric_send_failed", span_name = name, metric = self.metric)
    }
}
