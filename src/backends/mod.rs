// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugin implementations for the gordon event service.
//!
//! # Available Backends
//!
//! ## Local Backend
//! Built-in, in-process plugins selected by name in `[core] plugins`:
//! - **local.json_lines**: reads JSON lines from a file and feeds them to the
//!   router at `consume`; acknowledges them again in `cleanup`
//! - **local.static_enricher**: merges fixed fields into payloads at `enrich`
//! - **local.log_publisher**: logs payloads at `publish`
//!
//! ## Stub Backend (Test-Only)
//! Test doubles that record what the router does with them:
//! - **RecordingRelay**: metric relay capturing every counter, gauge and timer call
//! - **StubHandler** / **FailingHandler** / **HangingHandler**: handlers that
//!   succeed, fail, or never return
//! - **BatchRunnable**: producer that enqueues a fixed batch
//!
//! # Architecture
//!
//! ```text
//! Configuration → LocalPluginFactory → LoadedPlugin { runnable, handler } → Router
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
