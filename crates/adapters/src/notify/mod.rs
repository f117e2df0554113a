// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapter for outbound status-change messages

use async_trait::async_trait;
use thiserror::Error;
use vk_core::{Booking, BookingStatus};

pub mod fake;
pub mod webhook;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifier;
pub use webhook::WebhookNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("notifier unavailable: {0}")]
    Unavailable(String),
}

/// A status-change message about one booking
#[derive(Debug, Clone)]
pub struct Notification {
    /// Snapshot of the booking at the time of the transition
    pub booking: Booking,
    pub new_status: BookingStatus,
    pub reason: Option<String>,
}

/// Adapter trait for notification delivery
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    /// Send one notification; callers treat failures as fire-and-forget
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that silently drops everything
#[derive(Clone, Debug, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}
