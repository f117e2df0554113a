// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook notifier: JSON POST to a configured endpoint

use super::{Notification, Notifier, NotifyError};
use async_trait::async_trait;

/// Delivers notifications as JSON to one webhook URL
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn payload(notification: &Notification) -> String {
        serde_json::json!({
            "booking_id": notification.booking.id.to_string(),
            "contact_email": notification.booking.contact.email,
            "status": notification.new_status,
            "start_date": notification.booking.schedule.start_date.to_string(),
            "reason": notification.reason,
        })
        .to_string()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let url = self.url.clone();
        let body = Self::payload(notification);
        // ureq is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            ureq::post(&url)
                .header("content-type", "application/json")
                .send(&body)
                .map(|_| ())
                .map_err(|e| NotifyError::Delivery(e.to_string()))
        })
        .await
        .map_err(|e| NotifyError::Unavailable(e.to_string()))?
    }
}
