// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::router::{Router, RouterStats};
use crate::errors::PluginError;
use crate::observability::messages::plugin::{RunnableFailed, RunnableFinished};
use crate::observability::messages::StructuredLog;
use crate::traits::{MetricRelay, Runnable};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A fully wired service: producers feeding one router.
///
/// Producers and the router run concurrently. The service ends when the
/// router stops, either on the shutdown sentinel or on cancellation. A
/// producer finishing or failing does not stop the router.
pub struct Service {
    router: Arc<Router>,
    runnables: Vec<Arc<dyn Runnable>>,
    metrics: Arc<dyn MetricRelay>,
}

impl Service {
    pub fn new(
        router: Arc<Router>,
        runnables: Vec<Arc<dyn Runnable>>,
        metrics: Arc<dyn MetricRelay>,
    ) -> Self {
        Self {
            router,
            runnables,
            metrics,
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn runnables(&self) -> &[Arc<dyn Runnable>] {
        &self.runnables
    }

    /// Run until the router stops, then shut every producer down and
    /// release the metric relay.
    pub async fn run(self, cancel: CancellationToken) -> RouterStats {
        let mut producers: JoinSet<(String, Result<(), PluginError>)> = JoinSet::new();
        for runnable in &self.runnables {
            let runnable = Arc::clone(runnable);
            producers.spawn(async move {
                let result = runnable.run().await;
                (runnable.name().to_string(), result)
            });
        }

        let router = Arc::clone(&self.router).run(cancel.clone());
        tokio::pin!(router);

        let stats = loop {
            tokio::select! {
                stats = &mut router => break stats,
                Some(joined) = producers.join_next() => report_producer(joined),
            }
        };

        producers.abort_all();
        for runnable in &self.runnables {
            if let Err(error) = runnable.shutdown().await {
                RunnableFailed {
                    plugin: runnable.name(),
                    error: &error,
                }
                .log();
            }
        }
        self.metrics.cleanup().await;
        stats
    }
}

fn report_producer(joined: Result<(String, Result<(), PluginError>), tokio::task::JoinError>) {
    match joined {
        Ok((name, Ok(()))) => RunnableFinished { plugin: &name }.log(),
        Ok((name, Err(error))) => RunnableFailed {
            plugin: &name,
            error: &error,
        }
        .log(),
        Err(error) => RunnableFailed {
            plugin: "unknown",
            error: &error,
        }
        .log(),
    }
}
