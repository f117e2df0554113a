// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vk-engine: the booking lifecycle engine
//!
//! This crate provides:
//! - The lifecycle service: one transition = one guarded transaction
//! - Per-edge transition guards, including the fail-open overlap guard
//! - The unit of work with deadline and lock-retry policy
//! - Overlap detection and calendar unavailability
//! - The fixed-window rate limiter
//! - The fire-and-forget notification outbox

pub mod error;
pub mod guards;
pub mod lifecycle;
pub mod outbox;
pub mod overlap;
pub mod rate_limit;
pub mod unit_of_work;

// Re-exports
pub use error::LifecycleError;
pub use guards::{GuardOutcome, TransitionContext};
pub use lifecycle::{LifecycleService, NewBookingRequest};
pub use outbox::{Outbox, OutboxConfig, OutboxHandle};
pub use overlap::{BlockedRange, Conflicts, OverlapEngine, Unavailability};
pub use rate_limit::{RateDecision, RateLimiter};
pub use unit_of_work::{TxFuture, UnitOfWork};
