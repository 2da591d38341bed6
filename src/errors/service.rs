// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{ConfigError, PluginError, RouterError};
use thiserror::Error;

/// Anything that prevents a service from being assembled.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Router(#[from] RouterError),
}
