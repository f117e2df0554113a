// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notifier for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Notification, Notifier, NotifyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Fake notifier that records deliveries and can fail on demand
#[derive(Clone, Default)]
pub struct FakeNotifier {
    calls: Arc<Mutex<Vec<Notification>>>,
    fail_remaining: Arc<Mutex<u32>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<Notification> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Fail the next `n` delivery attempts
    pub fn fail_next(&self, n: u32) {
        *self.fail_remaining.lock().unwrap_or_else(|e| e.into_inner()) = n;
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        {
            let mut remaining = self.fail_remaining.lock().unwrap_or_else(|e| e.into_inner());
            if *remaining > 0 {
                *remaining -= 1;
                return Err(NotifyError::Delivery("scripted failure".to_string()));
            }
        }
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
