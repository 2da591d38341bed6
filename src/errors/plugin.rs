// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for plugin loading and plugin runtime failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    /// An active plugin name has no registered implementation.
    #[error("Plugin '{0}' not installed")]
    NotInstalled(String),

    /// A plugin's constructor rejected its configuration.
    #[error("Failed to load plugin '{plugin}': {reason}")]
    LoadFailed { plugin: String, reason: String },

    /// A required kind of plugin is missing from the active set.
    #[error("Missing plugin: {0}")]
    Missing(String),

    /// A plugin was loaded but provides no usable capability.
    #[error("Invalid plugin '{plugin}': {reason}")]
    Invalid { plugin: String, reason: String },

    /// I/O failure while a plugin was running.
    #[error("I/O error in plugin '{plugin}': {source}")]
    Io {
        plugin: String,
        #[source]
        source: std::io::Error,
    },

    /// The success queue was closed while a plugin still produced messages.
    #[error("Success queue closed while plugin '{0}' was running")]
    QueueClosed(String),
}
