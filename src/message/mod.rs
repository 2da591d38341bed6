// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The event message: the unit of work routed between plugins.
//!
//! A message carries an opaque JSON payload, the phase it is about to enter
//! and an append-only audit history. Producers create messages at their entry
//! phase; afterwards only the router changes the phase.

pub mod phase;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::MessageError;
pub use phase::Phase;

/// Opaque unique message identifier.
///
/// Generated identifiers are ULIDs; identifiers supplied by a producer
/// (for example a broker's delivery id) are preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One audit line in a message's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub phase: Phase,
}

/// A discrete unit of work flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(default)]
    id: MessageId,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    phase: Phase,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl EventMessage {
    /// Create a message with a fresh identifier at its entry phase.
    pub fn new(payload: serde_json::Value, phase: impl Into<Phase>) -> Self {
        Self::with_id(MessageId::new(), payload, phase)
    }

    pub fn with_id(id: impl Into<MessageId>, payload: serde_json::Value, phase: impl Into<Phase>) -> Self {
        Self {
            id: id.into(),
            payload,
            phase: phase.into(),
            history: Vec::new(),
        }
    }

    /// Decode a message from JSON and check it is routable.
    pub fn from_json(raw: &str) -> Result<Self, MessageError> {
        let msg: EventMessage = serde_json::from_str(raw)?;
        msg.validate()?;
        Ok(msg)
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut serde_json::Value {
        &mut self.payload
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Append an audit entry. Entries are never removed.
    pub fn append_to_history(&mut self, text: impl Into<String>, phase: &Phase) {
        self.history.push(HistoryEntry {
            text: text.into(),
            phase: phase.clone(),
        });
    }

    /// Move the message to the phase about to be attempted.
    pub(crate) fn update_phase(&mut self, next: Phase) {
        self.phase = next;
    }

    /// Check the fields the router relies on are present.
    pub fn validate(&self) -> Result<(), MessageError> {
        if self.id.as_str().is_empty() {
            return Err(MessageError::EmptyId);
        }
        if self.phase.is_empty() {
            return Err(MessageError::EmptyPhase {
                id: self.id.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for EventMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventMessage(id={}, phase={})", self.id, self.phase)
    }
}
