// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod in_flight;
pub mod queue;
pub mod router;
pub mod service;
#[cfg(test)]
pub mod integration_tests;

pub use in_flight::InFlightTracker;
pub use queue::{channel, Envelope, SuccessReceiver, SuccessSender};
pub use router::{Disposition, PollOutcome, Router, RouterOptions, RouterStats, StopReason};
pub use service::Service;
