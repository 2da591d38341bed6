// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Base configuration file read from the config root
pub const CONFIG_FILE_NAME: &str = "gordon.toml";
/// User overrides; its top-level tables replace those of the base file
pub const USER_CONFIG_FILE_NAME: &str = "gordon-user.toml";

/// How long the router waits for a poll before scheduling another one
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
/// Log level used when `[core.logging]` does not set one
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Key attached to every ffwd metric unless configured
pub const DEFAULT_METRICS_KEY: &str = "gordon";
pub const DEFAULT_FFWD_IP: &str = "127.0.0.1";
pub const DEFAULT_FFWD_PORT: u16 = 19000;

// Router metric names. Other tooling depends on these; do not rename.
pub const METRIC_PHASE_UPDATE: &str = "router-update-message-phase";
pub const METRIC_DROPPED: &str = "router-message-dropped";
pub const METRIC_COMPLETED: &str = "router-message-completed";
pub const METRIC_CONSUMED: &str = "router-message-consumed";
pub const METRIC_DISCARDED: &str = "router-message-discarded";
pub const METRIC_IN_FLIGHT: &str = "router-messages-in-flight";
pub const METRIC_FLIGHT_DURATION: &str = "router-message-flight-duration";

/// Error tag for messages rejected by the validity gate
pub const INVALID_MESSAGE_PROVIDER: &str = "invalid-message-provider";
