// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! File-backed event consumer.
//!
//! Reads one JSON value per line and emits each as a message payload at the
//! entry phase. The same plugin acknowledges messages in the cleanup phase;
//! once the file is exhausted and every emitted message has been cleaned up
//! it sends the shutdown sentinel, so a finite input runs to completion.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::engine::queue::SuccessSender;
use crate::errors::{HandlerError, PluginError};
use crate::message::{phase, EventMessage, Phase};
use crate::observability::messages::plugin::{InputExhausted, InputLineSkipped};
use crate::observability::messages::StructuredLog;
use crate::traits::{MessageHandler, Runnable};

#[derive(Debug, Clone, Deserialize)]
pub struct JsonLinesConfig {
    pub path: PathBuf,
    /// Send the shutdown sentinel once all input has been cleaned up
    #[serde(default = "default_shutdown_on_eof")]
    pub shutdown_on_eof: bool,
}

fn default_shutdown_on_eof() -> bool {
    true
}

pub struct JsonLinesPlugin {
    name: String,
    config: JsonLinesConfig,
    sender: SuccessSender,
    emitted: AtomicU64,
    cleaned: AtomicU64,
    exhausted: AtomicBool,
    sentinel_sent: AtomicBool,
}

impl JsonLinesPlugin {
    pub fn new(name: &str, config: JsonLinesConfig, sender: SuccessSender) -> Self {
        Self {
            name: name.to_string(),
            config,
            sender,
            emitted: AtomicU64::new(0),
            cleaned: AtomicU64::new(0),
            exhausted: AtomicBool::new(false),
            sentinel_sent: AtomicBool::new(false),
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::SeqCst)
    }

    pub fn cleaned(&self) -> u64 {
        self.cleaned.load(Ordering::SeqCst)
    }

    fn maybe_request_shutdown(&self) {
        if !self.config.shutdown_on_eof || !self.exhausted.load(Ordering::SeqCst) {
            return;
        }
        let emitted = self.emitted();
        if self.cleaned() < emitted {
            return;
        }
        if !self.sentinel_sent.swap(true, Ordering::SeqCst) {
            InputExhausted {
                plugin: &self.name,
                messages: emitted,
            }
            .log();
            self.sender.shutdown();
        }
    }

    fn io_error(&self, source: std::io::Error) -> PluginError {
        PluginError::Io {
            plugin: self.name.clone(),
            source,
        }
    }
}

#[async_trait]
impl Runnable for JsonLinesPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), PluginError> {
        let file = File::open(&self.config.path)
            .await
            .map_err(|e| self.io_error(e))?;
        let mut lines = BufReader::new(file).lines();
        let mut line_number = 0;

        while let Some(line) = lines.next_line().await.map_err(|e| self.io_error(e))? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let payload: serde_json::Value = match serde_json::from_str(&line) {
                Ok(payload) => payload,
                Err(error) => {
                    InputLineSkipped {
                        plugin: &self.name,
                        line_number,
                        error: &error,
                    }
                    .log();
                    continue;
                }
            };

            self.emitted.fetch_add(1, Ordering::SeqCst);
            if self.sender.send(EventMessage::new(payload, phase::CONSUME)).is_err() {
                return Err(PluginError::QueueClosed(self.name.clone()));
            }
        }

        self.exhausted.store(true, Ordering::SeqCst);
        self.maybe_request_shutdown();
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), PluginError> {
        tracing::debug!(
            plugin = %self.name,
            emitted = self.emitted(),
            cleaned = self.cleaned(),
            "Shutting down json lines consumer"
        );
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for JsonLinesPlugin {
    fn phase(&self) -> Phase {
        Phase::cleanup()
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_message(&self, msg: &mut EventMessage) -> Result<(), HandlerError> {
        tracing::debug!(plugin = %self.name, message_id = %msg.id(), "Acknowledged message");
        self.cleaned.fetch_add(1, Ordering::SeqCst);
        self.maybe_request_shutdown();
        Ok(())
    }
}
