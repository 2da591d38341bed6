// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for plugin loading and runnable lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Plugins loaded from configuration.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use gordon::observability::messages::plugin::PluginsLoaded;
///
/// let names = vec!["local.json_lines".to_string(), "local.log_publisher".to_string()];
/// let msg = PluginsLoaded { names: &names };
///
/// assert_eq!(msg.to_string(), "Loaded 2 plugins: local.json_lines, local.log_publisher");
/// ```
pub struct PluginsLoaded<'a> {
    pub names: &'a [String],
}

impl Display for PluginsLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded {} plugins: {}", self.names.len(), self.names.join(", "))
    }
}

impl StructuredLog for PluginsLoaded<'_> {
    fn log(&self) {
        tracing::info!(plugin_count = self.names.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("plugins_loaded", span_name = name, plugin_count = self.names.len())
    }
}

/// Active plugin skipped because it has no configuration.
///
/// # Log Level
/// `info!` - Operational note
pub struct PluginSkipped<'a> {
    pub plugin: &'a str,
}

impl Display for PluginSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped loading plugin '{}' because no configuration was found",
            self.plugin
        )
    }
}

impl StructuredLog for PluginSkipped<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.plugin, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("plugin_skipped", span_name = name, plugin = self.plugin)
    }
}

/// Plugin problem tolerated because the service runs in debug mode.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct PluginProblemTolerated<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for PluginProblemTolerated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Continuing in debug mode despite plugin problem: {}", self.error)
    }
}

impl StructuredLog for PluginProblemTolerated<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("plugin_problem", span_name = name, error = %self.error)
    }
}

/// Runnable plugin returned from `run()`.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunnableFinished<'a> {
    pub plugin: &'a str,
}

impl Display for RunnableFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Runnable '{}' finished", self.plugin)
    }
}

impl StructuredLog for RunnableFinished<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.plugin, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("runnable", span_name = name, plugin = self.plugin)
    }
}

/// Runnable plugin failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunnableFailed<'a> {
    pub plugin: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunnableFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Runnable '{}' failed: {}", self.plugin, self.error)
    }
}

impl StructuredLog for RunnableFailed<'_> {
    fn log(&self) {
        tracing::error!(plugin = self.plugin, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "runnable_failed",
            span_name = name,
            plugin = self.plugin,
            error = %self.error,
        )
    }
}

/// Input line that could not be turned into a message.
///
/// # Log Level
/// `warn!` - Input skipped
pub struct InputLineSkipped<'a> {
    pub plugin: &'a str,
    pub line_number: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for InputLineSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' skipped input line {}: {}",
            self.plugin, self.line_number, self.error
        )
    }
}

impl StructuredLog for InputLineSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            plugin = self.plugin,
            line_number = self.line_number,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("input_line", span_name = name, plugin = self.plugin)
    }
}

/// Message payload published by a publisher plugin.
///
/// # Log Level
/// `info!` - Delivery record
///
/// # Example
/// ```
/// use gordon::observability::messages::plugin::MessagePublished;
///
/// let payload = serde_json::json!({"name": "a.example.com."});
/// let msg = MessagePublished { plugin: "local.log_publisher", message_id: "01HZX3", payload: &payload };
///
/// assert_eq!(
///     msg.to_string(),
///     "Plugin 'local.log_publisher' published message 01HZX3: {\"name\":\"a.example.com.\"}"
/// );
/// ```
pub struct MessagePublished<'a> {
    pub plugin: &'a str,
    pub message_id: &'a str,
    pub payload: &'a serde_json::Value,
}

impl Display for MessagePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' published message {}: {}",
            self.plugin, self.message_id, self.payload
        )
    }
}

impl StructuredLog for MessagePublished<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.plugin, message_id = self.message_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("publish", span_name = name, message_id = self.message_id)
    }
}

/// Producer saw every message it emitted reach cleanup.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InputExhausted<'a> {
    pub plugin: &'a str,
    pub messages: u64,
}

impl Display for InputExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' cleaned up all {} messages, requesting router shutdown",
            self.plugin, self.messages
        )
    }
}

impl StructuredLog for InputExhausted<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.plugin, messages = self.messages, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("input_exhausted", span_name = name, plugin = self.plugin)
    }
}
