// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod plugins;

pub use factory::{LoadedPlugin, LocalPluginFactory, PluginContext};
pub use plugins::*;
