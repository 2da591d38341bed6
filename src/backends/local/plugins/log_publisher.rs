// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::HandlerError;
use crate::message::{phase, EventMessage, Phase};
use crate::observability::messages::plugin::MessagePublished;
use crate::observability::messages::StructuredLog;
use crate::traits::MessageHandler;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogPublisherConfig {
    /// Top-level payload fields a message must carry to be published
    #[serde(default)]
    pub required_fields: Vec<String>,
}

/// Publisher that writes each payload to the log.
pub struct LogPublisher {
    name: String,
    required_fields: Vec<String>,
}

impl LogPublisher {
    pub fn new(name: &str, config: LogPublisherConfig) -> Self {
        Self {
            name: name.to_string(),
            required_fields: config.required_fields,
        }
    }

    fn check_required(&self, msg: &EventMessage) -> Result<(), HandlerError> {
        if self.required_fields.is_empty() {
            return Ok(());
        }
        let payload = msg.payload().as_object().ok_or_else(|| {
            HandlerError::InvalidMessage(format!("payload of message {} is not a JSON object", msg.id()))
        })?;
        match self.required_fields.iter().find(|f| !payload.contains_key(f.as_str())) {
            Some(missing) => Err(HandlerError::InvalidMessage(format!(
                "message {} is missing required field '{}'",
                msg.id(),
                missing
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MessageHandler for LogPublisher {
    fn phase(&self) -> Phase {
        Phase::from(phase::PUBLISH)
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_message(&self, msg: &mut EventMessage) -> Result<(), HandlerError> {
        self.check_required(msg)?;
        MessagePublished {
            plugin: &self.name,
            message_id: msg.id().as_str(),
            payload: msg.payload(),
        }
        .log();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn publisher(required: &[&str]) -> LogPublisher {
        LogPublisher::new(
            "local.log_publisher",
            LogPublisherConfig {
                required_fields: required.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    #[tokio::test]
    async fn test_publishes_anything_without_requirements() {
        let mut msg = EventMessage::new(json!("plain string"), phase::PUBLISH);
        assert!(publisher(&[]).handle_message(&mut msg).await.is_ok());
    }

    #[tokio::test]
    async fn test_publishes_when_required_fields_present() {
        let mut msg = EventMessage::new(json!({"name": "a", "rdata": "10.0.0.1"}), phase::PUBLISH);
        assert!(publisher(&["name", "rdata"]).handle_message(&mut msg).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_missing_required_field() {
        let mut msg = EventMessage::new(json!({"name": "a"}), phase::PUBLISH);

        let result = publisher(&["name", "rdata"]).handle_message(&mut msg).await;

        match result {
            Err(HandlerError::InvalidMessage(reason)) => assert!(reason.contains("'rdata'")),
            other => panic!("expected InvalidMessage, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_non_object_when_fields_required() {
        let mut msg = EventMessage::new(json!(42), phase::PUBLISH);
        let result = publisher(&["name"]).handle_message(&mut msg).await;
        assert!(matches!(result, Err(HandlerError::InvalidMessage(_))));
    }
}
