// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::HandlerError;
use crate::message::{EventMessage, Phase};

/// Anything that can process a message entering one specific phase.
///
/// The router holds handlers behind `Arc` and may have several calls
/// outstanding on the same instance for different messages, so
/// implementations must not assume serialized invocation.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// The phase slot this handler fills.
    fn phase(&self) -> Phase;

    fn name(&self) -> &str;

    /// Process the message. Any returned error diverts the message to cleanup.
    async fn handle_message(&self, msg: &mut EventMessage) -> Result<(), HandlerError>;
}
