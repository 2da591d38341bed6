// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::PluginError;

/// A long-running producer that feeds messages into the success queue.
#[async_trait]
pub trait Runnable: Send + Sync {
    fn name(&self) -> &str;

    /// Produce messages until the source is exhausted or the task is cancelled.
    async fn run(&self) -> Result<(), PluginError>;

    /// Release resources held by the producer.
    async fn shutdown(&self) -> Result<(), PluginError>;
}
