// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod handler;
mod message;
mod plugin;
mod router;
mod service;

pub use config::{ConfigError, RouteError};
pub use handler::HandlerError;
pub use message::MessageError;
pub use plugin::PluginError;
pub use router::RouterError;
pub use service::ServiceError;
