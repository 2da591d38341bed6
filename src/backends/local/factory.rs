// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::plugins::*;
use crate::engine::queue::SuccessSender;
use crate::errors::PluginError;
use crate::traits::{MessageHandler, Runnable};

/// Shared resources handed to every plugin at construction
#[derive(Clone)]
pub struct PluginContext {
    pub sender: SuccessSender,
}

/// A constructed plugin and the capabilities it provides.
///
/// One plugin may be both a producer and a handler (the json lines
/// consumer also acknowledges messages in cleanup).
pub struct LoadedPlugin {
    pub name: String,
    pub runnable: Option<Arc<dyn Runnable>>,
    pub handler: Option<Arc<dyn MessageHandler>>,
}

/// Factory for the built-in (in-process) plugins
pub struct LocalPluginFactory;

impl LocalPluginFactory {
    /// Create a plugin instance from its namespaced configuration
    ///
    /// - "local.json_lines" -> JsonLinesPlugin (runnable + cleanup handler, requires `path`)
    /// - "local.static_enricher" -> StaticEnricher (enrich handler)
    /// - "local.log_publisher" -> LogPublisher (publish handler)
    pub fn create_plugin(
        name: &str,
        config: &toml::Table,
        ctx: &PluginContext,
    ) -> Result<LoadedPlugin, PluginError> {
        match name {
            "local.json_lines" => {
                let plugin = Arc::new(JsonLinesPlugin::new(
                    name,
                    parse_config(name, config)?,
                    ctx.sender.clone(),
                ));
                Ok(LoadedPlugin {
                    name: name.to_string(),
                    runnable: Some(plugin.clone()),
                    handler: Some(plugin),
                })
            }
            "local.static_enricher" => Ok(LoadedPlugin {
                name: name.to_string(),
                runnable: None,
                handler: Some(Arc::new(StaticEnricher::new(name, parse_config(name, config)?))),
            }),
            "local.log_publisher" => Ok(LoadedPlugin {
                name: name.to_string(),
                runnable: None,
                handler: Some(Arc::new(LogPublisher::new(name, parse_config(name, config)?))),
            }),
            _ => Err(PluginError::NotInstalled(name.to_string())),
        }
    }

    /// List all installed plugin names
    pub fn list_available_plugins() -> Vec<&'static str> {
        vec!["local.json_lines", "local.static_enricher", "local.log_publisher"]
    }

    pub fn is_plugin_available(name: &str) -> bool {
        Self::list_available_plugins().contains(&name)
    }
}

fn parse_config<T: DeserializeOwned>(name: &str, config: &toml::Table) -> Result<T, PluginError> {
    toml::Value::Table(config.clone())
        .try_into()
        .map_err(|e: toml::de::Error| PluginError::LoadFailed {
            plugin: name.to_string(),
            reason: e.to_string(),
        })
}
