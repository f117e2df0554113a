// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget notification outbox
//!
//! Transitions enqueue and move on; a background worker delivers with a
//! few retries. Delivery failure never fails, blocks, or rolls back the
//! transition that produced it. When the queue is full the notification
//! is dropped with a warning rather than applying backpressure to the
//! request path.

use std::time::Duration;
use tokio::sync::mpsc;
use vk_adapters::{Notification, Notifier, Telemetry};

/// Outbox tuning
#[derive(Debug, Clone)]
pub struct OutboxConfig {
    pub capacity: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Handle for enqueueing notifications; cheap to clone
#[derive(Clone)]
pub struct OutboxHandle {
    sender: mpsc::Sender<Notification>,
}

impl OutboxHandle {
    /// Enqueue without waiting; a full or closed queue drops the message
    pub fn enqueue(&self, notification: Notification) {
        if let Err(err) = self.sender.try_send(notification) {
            tracing::warn!(%err, "dropping notification");
        }
    }
}

/// Spawns the delivery worker
pub struct Outbox;

impl Outbox {
    /// Start a worker on the current runtime and return its handle.
    ///
    /// The worker exits once every handle is dropped and the queue drains.
    pub fn spawn<N: Notifier, T: Telemetry>(
        notifier: N,
        telemetry: T,
        config: OutboxConfig,
    ) -> OutboxHandle {
        let (sender, mut receiver) = mpsc::channel(config.capacity.max(1));
        tokio::spawn(async move {
            while let Some(notification) = receiver.recv().await {
                deliver(&notifier, &telemetry, &config, notification).await;
            }
        });
        OutboxHandle { sender }
    }
}

async fn deliver<N: Notifier, T: Telemetry>(
    notifier: &N,
    telemetry: &T,
    config: &OutboxConfig,
    notification: Notification,
) {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match notifier.notify(&notification).await {
            Ok(()) => return,
            Err(err) if attempt >= config.max_attempts => {
                tracing::warn!(
                    booking = %notification.booking.id,
                    %err,
                    attempt,
                    "notification dropped after retries"
                );
                telemetry.notify_failure();
                return;
            }
            Err(err) => {
                tracing::debug!(booking = %notification.booking.id, %err, attempt, "delivery failed; retrying");
                let factor = 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(config.retry_delay.saturating_mul(factor)).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
