// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod json_lines;
pub mod log_publisher;
pub mod static_enricher;

pub use json_lines::*;
pub use log_publisher::*;
pub use static_enricher::*;
