// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capability contracts between the router and its plugins.

pub mod handler;
pub mod metrics;
pub mod runnable;

pub use handler::MessageHandler;
pub use metrics::{metric_context, time_scope, MetricContext, MetricRelay, Timer};
pub use runnable::Runnable;
