// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backends::stub::{BatchRunnable, FailingHandler, HangingHandler, RecordingRelay, StubHandler};
use crate::config::consts::{METRIC_COMPLETED, METRIC_DROPPED, METRIC_IN_FLIGHT};
use crate::config::PhaseRoute;
use crate::engine::{channel, Router, RouterOptions, Service, StopReason, SuccessSender};
use crate::message::{phase, EventMessage};
use crate::traits::{MessageHandler, MetricRelay, Runnable};

/// Integration tests for the router loop and the service around it
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn options() -> RouterOptions {
        RouterOptions {
            poll_interval: Duration::from_millis(10),
            handler_timeout: Some(Duration::from_secs(5)),
            runtime: None,
        }
    }

    fn build_router(
        handlers: Vec<Arc<dyn MessageHandler>>,
        options: RouterOptions,
    ) -> (Arc<Router>, SuccessSender, Arc<RecordingRelay>) {
        let phases: Vec<_> = handlers.iter().map(|h| h.phase()).collect();
        let route = PhaseRoute::default_for(phases.iter());
        let (sender, receiver) = channel();
        let relay = Arc::new(RecordingRelay::new());
        let metrics: Arc<dyn MetricRelay> = relay.clone();
        let router = Router::new(route, sender.clone(), receiver, handlers, metrics, options).unwrap();
        (Arc::new(router), sender, relay)
    }

    fn events(count: usize) -> Vec<EventMessage> {
        (0..count)
            .map(|i| EventMessage::new(json!({"name": format!("host{}.example.com.", i)}), phase::CONSUME))
            .collect()
    }

    /// Wait until `done` holds, failing the test after two seconds.
    async fn wait_for(done: impl Fn() -> bool) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_run_stops_on_sentinel_after_messages() {
        let publisher = Arc::new(StubHandler::new("publisher", phase::PUBLISH));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let (router, sender, relay) = build_router(vec![publisher.clone(), cleanup.clone()], options());

        for msg in events(5) {
            sender.send(msg).unwrap();
        }

        let stop = async {
            wait_for(|| router.stats().completed == 5).await;
            assert!(sender.shutdown());
        };
        let (stats, _) = tokio::join!(
            Arc::clone(&router).run(CancellationToken::new()),
            stop
        );

        assert_eq!(stats.stop_reason, Some(StopReason::Shutdown));
        assert_eq!(stats.completed, 5);
        assert_eq!(stats.dropped, 0);
        assert_eq!(publisher.call_count(), 5);
        assert_eq!(cleanup.call_count(), 5);
        assert_eq!(router.in_flight().len().await, 0);
        assert!(router.is_stopping());
        assert_eq!(relay.counter_total(METRIC_COMPLETED), 5);
        assert_eq!(relay.gauge_values(METRIC_IN_FLIGHT).last(), Some(&0.0));
    }

    #[tokio::test]
    async fn test_messages_behind_sentinel_are_not_consumed() {
        let publisher = Arc::new(StubHandler::new("publisher", phase::PUBLISH));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let (router, sender, _relay) = build_router(vec![publisher.clone(), cleanup], options());

        sender.shutdown();
        for msg in events(3) {
            sender.send(msg).unwrap();
        }

        let stats = tokio::time::timeout(
            Duration::from_secs(2),
            Arc::clone(&router).run(CancellationToken::new()),
        )
        .await
        .unwrap();

        assert_eq!(stats.stop_reason, Some(StopReason::Shutdown));
        assert_eq!(stats.consumed, 0);
        assert_eq!(publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_a_blocked_router() {
        let publisher: Arc<dyn MessageHandler> = Arc::new(HangingHandler::new(phase::PUBLISH));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let mut opts = options();
        opts.handler_timeout = None;
        let (router, sender, _relay) = build_router(vec![publisher, cleanup.clone()], opts);
        let cancel = CancellationToken::new();

        for msg in events(1) {
            sender.send(msg).unwrap();
        }

        let stop = async {
            for _ in 0..200 {
                if router.in_flight().len().await == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            cancel.cancel();
        };
        let (stats, _) = tokio::join!(Arc::clone(&router).run(cancel.clone()), stop);

        assert_eq!(stats.stop_reason, Some(StopReason::Cancelled));
        assert_eq!(stats.completed, 0);
        assert_eq!(cleanup.call_count(), 0);
        // the aborted message never reached a terminal phase
        assert_eq!(router.in_flight().len().await, 1);
    }

    #[tokio::test]
    async fn test_slow_handler_does_not_serialize_messages() {
        let delay = Duration::from_millis(150);
        let publisher = Arc::new(StubHandler::new("publisher", phase::PUBLISH).with_delay(delay));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let (router, sender, _relay) = build_router(vec![publisher, cleanup], options());

        for msg in events(3) {
            sender.send(msg).unwrap();
        }

        let started = Instant::now();
        let stop = async {
            wait_for(|| router.stats().completed == 3).await;
            sender.shutdown();
        };
        let (stats, _) = tokio::join!(Arc::clone(&router).run(CancellationToken::new()), stop);

        assert_eq!(stats.completed, 3);
        assert!(
            started.elapsed() < delay * 3,
            "messages were handled one at a time: {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_run_on_explicit_runtime_handle() {
        let publisher = Arc::new(StubHandler::new("publisher", phase::PUBLISH));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let opts = options().with_runtime(tokio::runtime::Handle::current());
        let (router, sender, _relay) = build_router(vec![publisher, cleanup], opts);

        for msg in events(2) {
            sender.send(msg).unwrap();
        }

        let stop = async {
            wait_for(|| router.stats().completed == 2).await;
            sender.shutdown();
        };
        let (stats, _) = tokio::join!(Arc::clone(&router).run(CancellationToken::new()), stop);

        assert_eq!(stats.stop_reason, Some(StopReason::Shutdown));
        assert_eq!(stats.completed, 2);
    }

    #[tokio::test]
    async fn test_service_feeds_router_from_runnable() {
        let publisher = Arc::new(StubHandler::new("publisher", phase::PUBLISH));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let (router, sender, relay) = build_router(vec![publisher, cleanup], options());
        let batch = Arc::new(BatchRunnable::new(sender, events(4), false));
        let runnables: Vec<Arc<dyn Runnable>> = vec![batch.clone()];
        let metrics: Arc<dyn MetricRelay> = relay.clone();
        let service = Service::new(Arc::clone(&router), runnables, metrics);
        let cancel = CancellationToken::new();

        let stop = async {
            wait_for(|| router.stats().completed == 4).await;
            cancel.cancel();
        };
        let (stats, _) = tokio::join!(service.run(cancel.clone()), stop);

        assert_eq!(stats.stop_reason, Some(StopReason::Cancelled));
        assert_eq!(stats.completed, 4);
        assert_eq!(batch.shutdown_calls(), 1);
    }

    #[tokio::test]
    async fn test_service_with_failing_publisher_drops_everything() {
        let publisher = Arc::new(FailingHandler::new("publisher", phase::PUBLISH));
        let cleanup = Arc::new(StubHandler::new("cleanup", phase::CLEANUP));
        let (router, sender, relay) = build_router(vec![publisher.clone(), cleanup.clone()], options());
        let batch = Arc::new(BatchRunnable::new(sender, events(3), false));
        let metrics: Arc<dyn MetricRelay> = relay.clone();
        let service = Service::new(Arc::clone(&router), vec![batch as Arc<dyn Runnable>], metrics);
        let cancel = CancellationToken::new();

        let stop = async {
            wait_for(|| router.stats().dropped == 3).await;
            cancel.cancel();
        };
        let (stats, _) = tokio::join!(service.run(cancel.clone()), stop);

        assert_eq!(stats.completed, 0);
        assert_eq!(stats.dropped, 3);
        assert_eq!(publisher.call_count(), 3);
        // forced cleanup still acknowledges every dropped message
        assert_eq!(cleanup.call_count(), 3);
        assert_eq!(relay.counter_total(METRIC_DROPPED), 3);
        assert_eq!(router.in_flight().len().await, 0);
    }
}
