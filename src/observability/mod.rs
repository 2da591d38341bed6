// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the service goes through the message types in
//! [`messages`]. Each type implements `Display` for the human-readable line
//! and [`messages::StructuredLog`] to emit it with structured fields at its
//! fixed level.
//!
//! # Usage
//!
//! ```rust
//! use gordon::observability::messages::StructuredLog;
//! use gordon::observability::messages::router::UnknownPhase;
//!
//! UnknownPhase {
//!     message_id: "01HZX3",
//!     phase: "bogus",
//!     fallback: "cleanup",
//! }
//! .log();
//! ```

pub mod messages;
