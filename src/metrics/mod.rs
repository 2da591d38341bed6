// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Metric relay backends.
//!
//! * [`LogRelay`] writes metrics to the application log (default)
//! * [`FfwdRelay`] sends metrics as JSON datagrams to an ffwd agent
//!
//! The backend is chosen by `[metrics] provider` in the configuration.

pub mod ffwd;
pub mod log;

pub use self::ffwd::FfwdRelay;
pub use self::log::LogRelay;

use crate::config::{MetricsConfig, MetricsProvider};
use crate::errors::ConfigError;
use crate::traits::MetricRelay;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::Level;

/// Build the metric relay selected by the configuration.
pub fn relay_from_config(config: &MetricsConfig) -> Result<Arc<dyn MetricRelay>, ConfigError> {
    match config.provider {
        MetricsProvider::Log => {
            let level: Level = config.log_level.parse().map_err(|_| {
                ConfigError::Invalid(format!("unknown metrics log_level '{}'", config.log_level))
            })?;
            Ok(Arc::new(LogRelay::new(level, config.time_unit)))
        }
        MetricsProvider::Ffwd => {
            let ip: IpAddr = config.ffwd_ip.parse().map_err(|_| {
                ConfigError::Invalid(format!("invalid ffwd_ip '{}'", config.ffwd_ip))
            })?;
            Ok(Arc::new(FfwdRelay::new(
                config.key.clone(),
                SocketAddr::new(ip, config.ffwd_port),
                config.time_unit,
            )))
        }
    }
}
