// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability counters
//!
//! The lifecycle reports what happened; it never depends on whether the
//! report went anywhere.

pub mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTelemetry;

/// Counters the core reports into
pub trait Telemetry: Clone + Send + Sync + 'static {
    /// A transaction lost the write lock to a contender
    fn lock_conflict(&self);
    /// A unit of work is retrying after lock contention
    fn retry(&self);
    /// A request was denied by the rate limiter
    fn rate_limit_hit(&self);
    /// The rate limiter failed open because the store errored
    fn rate_limit_bypass(&self);
    /// A unit of work failed for good
    fn tx_failure(&self);
    /// A notification was dropped after its retries
    fn notify_failure(&self);
    /// The overlap guard failed open because the store errored
    fn overlap_fail_open(&self);
}

/// Telemetry that discards everything
#[derive(Clone, Debug, Default)]
pub struct NoOpTelemetry;

impl Telemetry for NoOpTelemetry {
    fn lock_conflict(&self) {}
    fn retry(&self) {}
    fn rate_limit_hit(&self) {}
    fn rate_limit_bypass(&self) {}
    fn tx_failure(&self) {}
    fn notify_failure(&self) {}
    fn overlap_fail_open(&self) {}
}

/// Telemetry that emits tracing events
#[derive(Clone, Debug, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn lock_conflict(&self) {
        tracing::debug!(counter = "lock_conflict", "telemetry");
    }
    fn retry(&self) {
        tracing::debug!(counter = "retry", "telemetry");
    }
    fn rate_limit_hit(&self) {
        tracing::info!(counter = "rate_limit_hit", "telemetry");
    }
    fn rate_limit_bypass(&self) {
        tracing::warn!(counter = "rate_limit_bypass", "telemetry");
    }
    fn tx_failure(&self) {
        tracing::warn!(counter = "tx_failure", "telemetry");
    }
    fn notify_failure(&self) {
        tracing::warn!(counter = "notify_failure", "telemetry");
    }
    fn overlap_fail_open(&self) {
        tracing::warn!(counter = "overlap_fail_open", "telemetry");
    }
}
