// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod phase_route;
mod plugin_map;
mod runtime;

pub mod consts;

pub use loader::{
    load_config, Config, CoreConfig, LoggingConfig, MetricsConfig, MetricsProvider, RouterConfig,
};
pub use phase_route::PhaseRoute;
pub use plugin_map::PhasePluginMap;
pub use runtime::ServiceBuilder;
