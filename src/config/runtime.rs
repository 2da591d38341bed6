// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::local::{LoadedPlugin, LocalPluginFactory, PluginContext};
use crate::config::{Config, PhaseRoute};
use crate::engine::{self, Router, RouterOptions, Service};
use crate::errors::{PluginError, ServiceError};
use crate::message::Phase;
use crate::metrics::relay_from_config;
use crate::observability::messages::config::DefaultRouteApplied;
use crate::observability::messages::plugin::{PluginProblemTolerated, PluginSkipped, PluginsLoaded};
use crate::observability::messages::StructuredLog;
use crate::traits::{MessageHandler, MetricRelay, Runnable};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Service builder - assembles plugins, metrics and the router from configuration.
///
/// In debug mode (`core.debug = true`) plugin problems are logged and the
/// offending plugin is left out instead of failing the build. Unknown plugin
/// names, invalid routes and duplicate phase handlers always fail.
///
/// # Examples
///
/// ```no_run
/// use gordon::config::{load_config, ServiceBuilder};
///
/// let config = load_config("configs").unwrap();
/// let service = ServiceBuilder::new(&config).build().unwrap();
/// assert!(service.router().handler_count() > 0);
/// ```
pub struct ServiceBuilder<'a> {
    config: &'a Config,
    metrics: Option<Arc<dyn MetricRelay>>,
    runtime: Option<Handle>,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            metrics: None,
            runtime: None,
        }
    }

    /// Use this relay instead of the one named in `[metrics]`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricRelay>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Spawn router polls on this runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Service, ServiceError> {
        let debug = self.config.core.debug;
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => relay_from_config(&self.config.metrics)?,
        };

        let (sender, receiver) = engine::channel();
        let ctx = PluginContext {
            sender: sender.clone(),
        };
        let plugins = load_plugins(self.config, &ctx)?;
        let (runnables, handlers) = gather_plugins_by_type(plugins, debug)?;

        let route = if self.config.core.route.is_empty() {
            let phases: Vec<Phase> = handlers.iter().map(|h| h.phase()).collect();
            let route = PhaseRoute::default_for(phases.iter());
            DefaultRouteApplied {
                chain: &route.describe(),
            }
            .log();
            route
        } else {
            PhaseRoute::from_config(
                &self.config.core.route,
                &self.config.core.router.terminal_phases,
            )?
        };

        let mut options = RouterOptions::from_config(&self.config.core.router);
        if let Some(runtime) = self.runtime {
            options = options.with_runtime(runtime);
        }

        let router = Router::new(route, sender, receiver, handlers, Arc::clone(&metrics), options)?;
        Ok(Service::new(Arc::new(router), runnables, metrics))
    }
}

/// Instantiate every active plugin that has configuration.
fn load_plugins(config: &Config, ctx: &PluginContext) -> Result<Vec<LoadedPlugin>, PluginError> {
    let mut loaded = Vec::new();
    for name in &config.core.plugins {
        if !LocalPluginFactory::is_plugin_available(name) {
            return Err(PluginError::NotInstalled(name.clone()));
        }
        let Some(plugin_config) = config.plugin_config(name) else {
            PluginSkipped { plugin: name }.log();
            continue;
        };
        match LocalPluginFactory::create_plugin(name, &plugin_config, ctx) {
            Ok(plugin) => loaded.push(plugin),
            Err(error) => tolerate(error, config.core.debug)?,
        }
    }

    if !loaded.is_empty() {
        let names: Vec<String> = loaded.iter().map(|p| p.name.clone()).collect();
        PluginsLoaded { names: &names }.log();
    }
    Ok(loaded)
}

type GatheredPlugins = (Vec<Arc<dyn Runnable>>, Vec<Arc<dyn MessageHandler>>);

fn gather_plugins_by_type(
    plugins: Vec<LoadedPlugin>,
    debug: bool,
) -> Result<GatheredPlugins, PluginError> {
    let mut runnables = Vec::new();
    let mut handlers = Vec::new();
    for plugin in plugins {
        if plugin.runnable.is_none() && plugin.handler.is_none() {
            tolerate(
                PluginError::Invalid {
                    plugin: plugin.name,
                    reason: "provides neither a runnable nor a message handler".to_string(),
                },
                debug,
            )?;
            continue;
        }
        runnables.extend(plugin.runnable);
        handlers.extend(plugin.handler);
    }

    if runnables.is_empty() || handlers.is_empty() {
        tolerate(
            PluginError::Missing(
                "at least one runnable plugin and one message handler are required".to_string(),
            ),
            debug,
        )?;
    }
    Ok((runnables, handlers))
}

fn tolerate(error: PluginError, debug: bool) -> Result<(), PluginError> {
    if debug {
        PluginProblemTolerated { error: &error }.log();
        Ok(())
    } else {
        Err(error)
    }
}
