// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The phase route: which phase follows which.
//!
//! A route is a flat `phase -> next phase` mapping describing a linear
//! chain, plus the set of terminal phases and the phase failed messages are
//! diverted to. It is validated once at construction and immutable afterwards.
//!
//! # Validation
//!
//! 1. The route is not empty
//! 2. The diversion phase is terminal
//! 3. Every edge points at a terminal phase or at a phase that is routed further
//! 4. Following edges from any non-terminal phase reaches a terminal phase
//!    without revisiting a phase (a terminal phase may map to itself)
//!
//! All problems are collected rather than stopping at the first one.

use crate::errors::{ConfigError, RouteError};
use crate::message::{phase, Phase};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRoute {
    edges: BTreeMap<Phase, Phase>,
    terminal: BTreeSet<Phase>,
    diversion: Phase,
}

impl PhaseRoute {
    /// Build a route whose failures divert to `cleanup`.
    pub fn new<K, V, T>(
        edges: impl IntoIterator<Item = (K, V)>,
        terminal_phases: impl IntoIterator<Item = T>,
    ) -> Result<Self, ConfigError>
    where
        K: Into<Phase>,
        V: Into<Phase>,
        T: Into<Phase>,
    {
        Self::with_diversion(edges, terminal_phases, Phase::cleanup())
    }

    pub fn with_diversion<K, V, T>(
        edges: impl IntoIterator<Item = (K, V)>,
        terminal_phases: impl IntoIterator<Item = T>,
        diversion: impl Into<Phase>,
    ) -> Result<Self, ConfigError>
    where
        K: Into<Phase>,
        V: Into<Phase>,
        T: Into<Phase>,
    {
        let route = Self {
            edges: edges.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            terminal: terminal_phases.into_iter().map(Into::into).collect(),
            diversion: diversion.into(),
        };
        route.validate().map_err(ConfigError::Route)?;
        Ok(route)
    }

    /// Build a route from the `[core.route]` table.
    pub fn from_config(
        route: &BTreeMap<String, String>,
        terminal_phases: &[String],
    ) -> Result<Self, ConfigError> {
        Self::new(
            route.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            terminal_phases.iter().map(String::as_str),
        )
    }

    /// The default chain `consume -> [enrich] -> publish -> cleanup`.
    ///
    /// `enrich` is only part of the chain when some handler declares it, so
    /// a deployment without an enricher goes straight from consume to publish.
    pub fn default_for<'a>(handler_phases: impl IntoIterator<Item = &'a Phase>) -> Self {
        let has_enricher = handler_phases.into_iter().any(|p| p == phase::ENRICH);

        let mut chain = vec![Phase::consume()];
        if has_enricher {
            chain.push(Phase::from(phase::ENRICH));
        }
        chain.push(Phase::from(phase::PUBLISH));
        chain.push(Phase::cleanup());

        let mut edges: BTreeMap<Phase, Phase> = chain
            .windows(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();
        edges.insert(Phase::cleanup(), Phase::cleanup());

        Self {
            edges,
            terminal: BTreeSet::from([Phase::cleanup()]),
            diversion: Phase::cleanup(),
        }
    }

    /// Next phase after `current`, if `current` is routed.
    pub fn get(&self, current: &Phase) -> Option<&Phase> {
        self.edges.get(current)
    }

    pub fn is_terminal(&self, phase: &Phase) -> bool {
        self.terminal.contains(phase)
    }

    /// Terminal phase every failed message is forced to.
    pub fn diversion_phase(&self) -> &Phase {
        &self.diversion
    }

    pub fn terminal_phases(&self) -> impl Iterator<Item = &Phase> {
        self.terminal.iter()
    }

    /// Phases visited starting from `start`, ending at the first terminal phase.
    pub fn chain_from(&self, start: &Phase) -> Vec<Phase> {
        let mut chain = vec![start.clone()];
        let mut current = start;
        while !self.is_terminal(current) && chain.len() <= self.edges.len() {
            match self.edges.get(current) {
                Some(next) => {
                    chain.push(next.clone());
                    current = next;
                }
                None => break,
            }
        }
        chain
    }

    /// Human readable chain from the entry phase, e.g. `consume -> publish -> cleanup`.
    pub fn describe(&self) -> String {
        self.chain_from(&Phase::consume())
            .iter()
            .map(Phase::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn validate(&self) -> Result<(), Vec<RouteError>> {
        let mut errors = Vec::new();

        if self.edges.is_empty() {
            errors.push(RouteError::EmptyRoute);
        }

        if !self.is_terminal(&self.diversion) {
            errors.push(RouteError::DiversionPhaseNotTerminal {
                phase: self.diversion.to_string(),
            });
        }

        for (from, to) in &self.edges {
            if !self.is_terminal(to) && !self.edges.contains_key(to) {
                errors.push(RouteError::DeadEnd {
                    phase: from.to_string(),
                    next: to.to_string(),
                });
            }
        }

        errors.extend(self.find_cycles());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Walk from every non-terminal phase; a revisit before reaching a
    /// terminal phase is a cycle. Each cycle is reported once.
    fn find_cycles(&self) -> Vec<RouteError> {
        let mut errors = Vec::new();
        let mut settled: BTreeSet<&Phase> = BTreeSet::new();

        for start in self.edges.keys() {
            if self.is_terminal(start) || settled.contains(start) {
                continue;
            }

            let mut path: Vec<&Phase> = Vec::new();
            let mut current = start;
            loop {
                if self.is_terminal(current) || settled.contains(current) {
                    break;
                }
                if let Some(pos) = path.iter().position(|p| *p == current) {
                    let mut cycle: Vec<String> = path[pos..].iter().map(|p| p.to_string()).collect();
                    cycle.push(current.to_string());
                    errors.push(RouteError::CyclicRoute { cycle });
                    break;
                }
                path.push(current);
                match self.edges.get(current) {
                    Some(next) => current = next,
                    // reported as a dead end
                    None => break,
                }
            }
            settled.extend(path);
        }

        errors
    }
}
