// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors for messages arriving across an untyped boundary.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Message has an empty id")]
    EmptyId,

    #[error("Message '{id}' has an empty phase")]
    EmptyPhase { id: String },

    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),
}
