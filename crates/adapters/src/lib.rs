// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external collaborators
//!
//! Notification delivery and observability counters. Both are
//! fire-and-forget from the lifecycle's point of view: their failures are
//! logged at the boundary and never change the outcome of a booking
//! operation.

pub mod notify;
pub mod telemetry;

pub use notify::{NoOpNotifier, Notification, Notifier, NotifyError, WebhookNotifier};
pub use telemetry::{NoOpTelemetry, Telemetry, TracingTelemetry};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use telemetry::FakeTelemetry;
