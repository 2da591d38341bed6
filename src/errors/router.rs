// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while constructing a router.
///
/// Once built, a router never fails: every handler failure is recovered
/// by diverting the message to cleanup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("Phase '{phase}' already has handler '{existing}', refusing to register '{duplicate}'")]
    DuplicatePhaseHandler {
        phase: String,
        existing: String,
        duplicate: String,
    },
}
