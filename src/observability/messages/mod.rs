// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `router` - message routing, phase transitions and shutdown
//! * `plugin` - plugin loading and runnable lifecycle
//! * `config` - configuration file loading and route derivation
//! * `metrics` - metric backend failures

pub mod config;
pub mod metrics;
pub mod plugin;
pub mod router;

use std::fmt::Display;
use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message at its level with structured fields.
    fn log(&self);

    /// Open a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
