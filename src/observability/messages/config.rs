// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// A configuration file could not be read and was skipped.
///
/// # Log Level
/// `debug!` - Either file may legitimately be absent
pub struct ConfigFileSkipped<'a> {
    pub path: &'a Path,
    pub error: &'a dyn std::error::Error,
}

impl Display for ConfigFileSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping config file '{}': {}", self.path.display(), self.error)
    }
}

impl StructuredLog for ConfigFileSkipped<'_> {
    fn log(&self) {
        tracing::debug!(
            path = %self.path.display(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("config_file", span_name = name, path = %self.path.display())
    }
}

/// No route configured; the default chain is derived from handler phases.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use gordon::observability::messages::config::DefaultRouteApplied;
///
/// let msg = DefaultRouteApplied { chain: "consume -> publish -> cleanup" };
/// assert_eq!(msg.to_string(), "No phase route configured, using consume -> publish -> cleanup");
/// ```
pub struct DefaultRouteApplied<'a> {
    pub chain: &'a str,
}

impl Display for DefaultRouteApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No phase route configured, using {}", self.chain)
    }
}

impl StructuredLog for DefaultRouteApplied<'_> {
    fn log(&self) {
        tracing::info!(chain = self.chain, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("default_route", span_name = name, chain = self.chain)
    }
}
