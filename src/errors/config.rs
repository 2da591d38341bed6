// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating a phase route
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    /// The route contains no phases at all
    EmptyRoute,
    /// The phase used for failure diversion is not one of the terminal phases
    DiversionPhaseNotTerminal {
        /// The configured diversion phase
        phase: String,
    },
    /// A non-terminal phase routes back into itself or an earlier phase
    CyclicRoute {
        /// The phases visited, ending with the repeated one
        cycle: Vec<String>,
    },
    /// A phase routes to a phase that is neither terminal nor routed further
    DeadEnd {
        /// The phase holding the dangling edge
        phase: String,
        /// The phase it points at
        next: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::EmptyRoute => write!(f, "Phase route is empty"),
            RouteError::DiversionPhaseNotTerminal { phase } => {
                write!(f, "Diversion phase '{}' is not a terminal phase", phase)
            }
            RouteError::CyclicRoute { cycle } => {
                write!(f, "Cyclic phase route detected: {}", cycle.join(" -> "))
            }
            RouteError::DeadEnd { phase, next } => {
                write!(
                    f,
                    "Phase '{}' routes to '{}' which is neither terminal nor routed further",
                    phase, next
                )
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Errors raised while loading service configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither configuration file could be read from the root directory.
    #[error("Cannot load configuration from '{}'", .root.display())]
    NotFound { root: PathBuf },

    /// A configuration file exists but could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML.
    #[error("Failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The merged configuration does not match the expected shape.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The configured phase route failed validation.
    #[error("Invalid phase route: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Route(Vec<RouteError>),
}
