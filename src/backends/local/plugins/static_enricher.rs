// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::HandlerError;
use crate::message::{phase, EventMessage, Phase};
use crate::traits::MessageHandler;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticEnricherConfig {
    /// Fields merged into every payload; configured values win
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Enricher that merges a fixed set of fields into object payloads.
pub struct StaticEnricher {
    name: String,
    fields: Map<String, Value>,
}

impl StaticEnricher {
    pub fn new(name: &str, config: StaticEnricherConfig) -> Self {
        Self {
            name: name.to_string(),
            fields: config.fields,
        }
    }
}

#[async_trait]
impl MessageHandler for StaticEnricher {
    fn phase(&self) -> Phase {
        Phase::from(phase::ENRICH)
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_message(&self, msg: &mut EventMessage) -> Result<(), HandlerError> {
        let id = msg.id().clone();
        let Some(payload) = msg.payload_mut().as_object_mut() else {
            return Err(HandlerError::InvalidMessage(format!(
                "payload of message {} is not a JSON object",
                id
            )));
        };
        for (key, value) in &self.fields {
            payload.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
