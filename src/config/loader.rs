// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    CONFIG_FILE_NAME, DEFAULT_FFWD_IP, DEFAULT_FFWD_PORT, DEFAULT_LOG_LEVEL, DEFAULT_METRICS_KEY,
    DEFAULT_POLL_INTERVAL_MS, USER_CONFIG_FILE_NAME,
};
use crate::errors::ConfigError;
use crate::message::phase;
use crate::observability::messages::{config::ConfigFileSkipped, StructuredLog};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete service configuration.
///
/// Typed sections are parsed eagerly; everything else stays in the raw
/// TOML table so plugins can pick up their own namespaced settings.
///
/// # Example
/// ```toml
/// [core]
/// plugins = ["local.json_lines", "local.log_publisher"]
/// debug = false
///
/// [core.logging]
/// level = "info"
///
/// [core.route]
/// consume = "publish"
/// publish = "cleanup"
/// cleanup = "cleanup"
///
/// [core.router]
/// poll_interval_ms = 100
/// handler_timeout_secs = 30
///
/// [metrics]
/// provider = "log"
///
/// [local.json_lines]
/// path = "configs/events.jsonl"
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub core: CoreConfig,
    pub metrics: MetricsConfig,
    raw: toml::Table,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreConfig {
    /// Names of the plugins to activate
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Log plugin problems instead of refusing to start
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Flat phase -> next phase mapping; empty means derive the default chain
    #[serde(default)]
    pub route: BTreeMap<String, String>,
    #[serde(default)]
    pub router: RouterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub handler_timeout_secs: Option<u64>,
    #[serde(default = "default_terminal_phases")]
    pub terminal_phases: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            handler_timeout_secs: None,
            terminal_phases: default_terminal_phases(),
        }
    }
}

impl RouterConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsProvider {
    #[default]
    Log,
    Ffwd,
}

/// Settings for the metric relay. Fields not used by the chosen provider are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub provider: MetricsProvider,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Multiplier applied to elapsed seconds before timers report
    #[serde(default = "default_time_unit")]
    pub time_unit: f64,
    #[serde(default = "default_metrics_key")]
    pub key: String,
    #[serde(default = "default_ffwd_ip")]
    pub ffwd_ip: String,
    #[serde(default = "default_ffwd_port")]
    pub ffwd_port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            provider: MetricsProvider::default(),
            log_level: default_log_level(),
            time_unit: default_time_unit(),
            key: default_metrics_key(),
            ffwd_ip: default_ffwd_ip(),
            ffwd_port: default_ffwd_port(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_terminal_phases() -> Vec<String> {
    vec![phase::CLEANUP.to_string()]
}

fn default_time_unit() -> f64 {
    1.0
}

fn default_metrics_key() -> String {
    DEFAULT_METRICS_KEY.to_string()
}

fn default_ffwd_ip() -> String {
    DEFAULT_FFWD_IP.to_string()
}

fn default_ffwd_port() -> u16 {
    DEFAULT_FFWD_PORT
}

impl Config {
    /// Build a configuration from an already-merged TOML table.
    pub fn from_table(raw: toml::Table) -> Result<Self, ConfigError> {
        let core = section::<CoreConfig>(&raw, "core")?;
        let metrics = section::<MetricsConfig>(&raw, "metrics")?;
        Ok(Self { core, metrics, raw })
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: toml::Table =
            toml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::from_table(raw)
    }

    /// Configuration visible to one plugin.
    ///
    /// A plugin named `a.b` sees the keys of `[a]` overlaid with the keys of
    /// `[a.b]` (deeper tables win). Sub-tables belonging to any active plugin
    /// are excluded, so siblings never see each other's settings. Returns
    /// `None` when none of the plugin's tables exist.
    pub fn plugin_config(&self, plugin: &str) -> Option<toml::Table> {
        let segments: Vec<&str> = plugin.split('.').collect();
        let mut merged = toml::Table::new();
        let mut found = false;
        let mut node = &self.raw;

        for depth in 0..segments.len() {
            let Some(table) = node.get(segments[depth]).and_then(toml::Value::as_table) else {
                break;
            };
            found = true;
            let namespace = segments[..=depth].join(".");
            for (key, value) in table {
                if self.is_plugin_namespace(&format!("{}.{}", namespace, key)) {
                    continue;
                }
                merged.insert(key.clone(), value.clone());
            }
            node = table;
        }

        found.then_some(merged)
    }

    /// True if `namespace` is an active plugin name or a prefix of one.
    fn is_plugin_namespace(&self, namespace: &str) -> bool {
        self.core.plugins.iter().any(|p| {
            p == namespace
                || (p.starts_with(namespace) && p[namespace.len()..].starts_with('.'))
        })
    }

    pub fn raw(&self) -> &toml::Table {
        &self.raw
    }
}

fn section<T>(raw: &toml::Table, name: &str) -> Result<T, ConfigError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match raw.get(name) {
        Some(value) => value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(format!("[{}]: {}", name, e))),
        None => Ok(T::default()),
    }
}

/// Load `gordon.toml` and `gordon-user.toml` from `root`.
///
/// Top-level tables of the user file replace those of the base file.
/// Either file may be absent, but not both. A file that exists and fails
/// to parse is an error.
pub fn load_config(root: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let root = root.as_ref();
    let mut merged = toml::Table::new();
    let mut loaded_any = false;

    for file_name in [CONFIG_FILE_NAME, USER_CONFIG_FILE_NAME] {
        let path = root.join(file_name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                ConfigFileSkipped {
                    path: &path,
                    error: &error,
                }
                .log();
                continue;
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let table: toml::Table = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        merged.extend(table);
        loaded_any = true;
    }

    if !loaded_any {
        return Err(ConfigError::NotFound {
            root: root.to_path_buf(),
        });
    }
    Config::from_table(merged)
}
