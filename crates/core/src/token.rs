// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-limited response tokens for external parties
//!
//! The grace period is applied at validation time, never stored, so it can
//! be tuned without rewriting outstanding tokens.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// A token an external party presents to respond to their booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseToken {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl ResponseToken {
    /// Issue a fresh token expiring `ttl` from `now`
    pub fn issue(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: Uuid::new_v4(),
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or_default(),
        }
    }

    /// Validate a presented token, allowing `grace` past nominal expiry
    pub fn verify(
        &self,
        presented: Uuid,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<(), ValidationError> {
        if presented != self.token {
            return Err(ValidationError::TokenMismatch);
        }
        let deadline = self.expires_at + chrono::Duration::from_std(grace).unwrap_or_default();
        if now > deadline {
            return Err(ValidationError::TokenExpired);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
