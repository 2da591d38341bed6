// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in plugins
pub mod config;     // config loading, routes, service assembly
pub mod engine;     // router, queue and service loop
pub mod errors;     // error handling
pub mod message;    // event messages and phases
pub mod metrics;    // metric relays
pub mod observability;
pub mod traits;     // plugin and metric abstractions
