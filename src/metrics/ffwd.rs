// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Metric relay that ships metrics to an ffwd agent as JSON over UDP.
//!
//! Every call sends one datagram immediately. Delivery is best effort:
//! socket errors are logged and swallowed so metrics never affect routing.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::UdpSocket;
use tokio::sync::OnceCell;

use crate::observability::messages::{metrics::MetricSendFailed, StructuredLog};
use crate::traits::{MetricContext, MetricRelay, Timer};

/// Wire shape understood by the ffwd JSON protocol.
#[derive(Debug, Clone, Serialize)]
pub struct FfwdMetric {
    pub key: String,
    pub attributes: BTreeMap<String, String>,
    pub value: Option<f64>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tags: Vec<String>,
}

/// Fire-and-forget UDP sender, bound lazily on first use.
pub struct UdpClient {
    destination: SocketAddr,
    socket: OnceCell<UdpSocket>,
}

impl UdpClient {
    pub fn new(destination: SocketAddr) -> Self {
        Self {
            destination,
            socket: OnceCell::new(),
        }
    }

    pub async fn send(&self, metric: &FfwdMetric) {
        if let Err(error) = self.try_send(metric).await {
            MetricSendFailed {
                metric: metric.attributes.get("what").map(String::as_str).unwrap_or(""),
                destination: &self.destination.to_string(),
                error: &error,
            }
            .log();
        }
    }

    async fn try_send(&self, metric: &FfwdMetric) -> std::io::Result<()> {
        let bind_addr: SocketAddr = if self.destination.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = self
            .socket
            .get_or_try_init(|| UdpSocket::bind(bind_addr))
            .await?;
        let bytes = serde_json::to_vec(metric)?;
        socket.send_to(&bytes, self.destination).await?;
        Ok(())
    }
}

pub struct FfwdRelay {
    key: String,
    time_unit: f64,
    client: Arc<UdpClient>,
}

impl FfwdRelay {
    pub fn new(key: impl Into<String>, destination: SocketAddr, time_unit: f64) -> Self {
        Self {
            key: key.into(),
            time_unit,
            client: Arc::new(UdpClient::new(destination)),
        }
    }

    fn create_metric(&self, name: &str, value: Option<f64>, context: Option<MetricContext>) -> FfwdMetric {
        let mut attributes = context.unwrap_or_default();
        attributes.insert("what".to_string(), name.to_string());
        FfwdMetric {
            key: self.key.clone(),
            attributes,
            value,
            kind: "metric",
            tags: Vec::new(),
        }
    }
}

#[async_trait]
impl MetricRelay for FfwdRelay {
    /// ffwd aggregates counters itself, so increments are sent as-is.
    async fn incr(&self, name: &str, value: u64, context: Option<MetricContext>) {
        self.set(name, value as f64, context).await;
    }

    async fn set(&self, name: &str, value: f64, context: Option<MetricContext>) {
        let metric = self.create_metric(name, Some(value), context);
        self.client.send(&metric).await;
    }

    fn timer(&self, name: &str, context: Option<MetricContext>) -> Box<dyn Timer> {
        Box::new(FfwdTimer {
            metric: self.create_metric(name, None, context),
            client: Arc::clone(&self.client),
            time_unit: self.time_unit,
            started: None,
        })
    }
}

pub struct FfwdTimer {
    metric: FfwdMetric,
    client: Arc<UdpClient>,
    time_unit: f64,
    started: Option<Instant>,
}

#[async_trait]
impl Timer for FfwdTimer {
    async fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    async fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.metric.value = Some(started.elapsed().as_secs_f64() * self.time_unit);
            self.client.send(&self.metric).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::metric_context;
    use std::time::Duration;

    async fn receive_json(socket: &UdpSocket) -> serde_json::Value {
        let mut buf = vec![0u8; 4096];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
            .await
            .expect("datagram not received in time")
            .unwrap();
        serde_json::from_slice(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_incr_sends_metric_datagram() {
        let agent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let relay = FfwdRelay::new("gordon", agent.local_addr().unwrap(), 1.0);

        relay
            .incr("router-message-dropped", 1, Some(metric_context([("error", "Timeout")])))
            .await;

        let metric = receive_json(&agent).await;
        assert_eq!(metric["key"], "gordon");
        assert_eq!(metric["type"], "metric");
        assert_eq!(metric["value"], 1.0);
        assert_eq!(metric["attributes"]["what"], "router-message-dropped");
        assert_eq!(metric["attributes"]["error"], "Timeout");
        assert_eq!(metric["tags"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_timer_sends_elapsed_on_stop() {
        let agent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let relay = FfwdRelay::new("gordon", agent.local_addr().unwrap(), 1000.0);

        let mut timer = relay.timer("router-message-flight-duration", None);
        timer.start().await;
        timer.stop().await;

        let metric = receive_json(&agent).await;
        assert_eq!(metric["attributes"]["what"], "router-message-flight-duration");
        assert!(metric["value"].as_f64().unwrap() >= 0.0);
    }

    #[test]
    fn test_create_metric_keeps_context_attributes() {
        let relay = FfwdRelay::new("svc", "127.0.0.1:19000".parse().unwrap(), 1.0);
        let metric = relay.create_metric("m", None, Some(metric_context([("current", "consume")])));

        assert_eq!(metric.attributes.get("what").unwrap(), "m");
        assert_eq!(metric.attributes.get("current").unwrap(), "consume");
        assert!(metric.value.is_none());
    }
}
