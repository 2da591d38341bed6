// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::RouterError;
use crate::message::Phase;
use crate::traits::MessageHandler;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry mapping each phase to the one handler that fills it.
///
/// Handlers are keyed by the phase they declare. Registering a second
/// handler for an occupied phase is an error rather than a silent replace.
///
/// # Example
/// ```ignore
/// let map = PhasePluginMap::from_handlers(vec![publisher, cleaner])?;
/// let handler = map.get(&Phase::from("publish")).unwrap();
/// ```
#[derive(Clone, Default)]
pub struct PhasePluginMap(HashMap<Phase, Arc<dyn MessageHandler>>);

impl PhasePluginMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn from_handlers(
        handlers: impl IntoIterator<Item = Arc<dyn MessageHandler>>,
    ) -> Result<Self, RouterError> {
        let mut map = Self::new();
        for handler in handlers {
            map.insert(handler)?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, handler: Arc<dyn MessageHandler>) -> Result<(), RouterError> {
        let phase = handler.phase();
        if let Some(existing) = self.0.get(&phase) {
            return Err(RouterError::DuplicatePhaseHandler {
                phase: phase.to_string(),
                existing: existing.name().to_string(),
                duplicate: handler.name().to_string(),
            });
        }
        self.0.insert(phase, handler);
        Ok(())
    }

    pub fn get(&self, phase: &Phase) -> Option<&Arc<dyn MessageHandler>> {
        self.0.get(phase)
    }

    pub fn contains(&self, phase: &Phase) -> bool {
        self.0.contains_key(phase)
    }

    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
