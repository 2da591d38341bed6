// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Entry phase assigned by ingesting runnables.
pub const CONSUME: &str = "consume";
/// Optional enrichment phase.
pub const ENRICH: &str = "enrich";
/// Phase that delivers a message to its destination.
pub const PUBLISH: &str = "publish";
/// Terminal phase every message ends in, successful or not.
pub const CLEANUP: &str = "cleanup";

/// Name of a stage in the linear processing pipeline.
///
/// Phases are plain strings so routes can be supplied from configuration;
/// the well-known names are exposed as constants in this module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Phase(String);

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn consume() -> Self {
        Self::new(CONSUME)
    }

    pub fn cleanup() -> Self {
        Self::new(CLEANUP)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Phase {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for Phase {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Phase {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Phase {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
