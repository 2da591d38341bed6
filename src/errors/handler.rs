// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors returned by message handlers.
//!
//! Every variant is recovered by the router the same way: the message is
//! diverted to the cleanup phase and a `router-message-dropped` counter is
//! emitted, tagged with [`HandlerError::kind`].

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    /// The message cannot be processed by this phase (bad payload, missing fields).
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// A downstream system the handler depends on is unavailable.
    #[error("Destination unavailable: {0}")]
    Unavailable(String),

    /// The handler did not finish within the router's handler timeout.
    #[error("Handler timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure reported by the handler.
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// Unexpected infrastructure failure inside the handler itself, reported
    /// by the handler. A Rust panic in a handler is not converted to this.
    #[error("Infrastructure panic: {0}")]
    Panic(String),
}

impl HandlerError {
    /// Short, stable name used to tag the dropped-message metric.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::InvalidMessage(_) => "InvalidMessage",
            HandlerError::Unavailable(_) => "Unavailable",
            HandlerError::Timeout(_) => "Timeout",
            HandlerError::Other(_) => "Other",
            HandlerError::Panic(_) => "Panic",
        }
    }
}
