// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the booking system
//!
//! Loaded from TOML. Durations use humantime strings ("5s", "1h"). The
//! fail-open policies of the rate limiter and the overlap guard are
//! deliberate availability choices and tunable here.

use crate::error::ValidationError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rate limiter settings: fixed window, per-operation-class limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length; buckets are keyed by the window start
    #[serde(with = "humantime_serde")]
    pub window: Duration,
    /// Default per-identity limit within one window
    pub limit: u32,
    /// Per-operation-class overrides of the default limit
    pub overrides: HashMap<String, u32>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(3600),
            limit: 5,
            overrides: HashMap::new(),
        }
    }
}

impl RateLimitConfig {
    pub fn limit_for(&self, class: &str) -> u32 {
        self.overrides.get(class).copied().unwrap_or(self.limit)
    }
}

/// Unit-of-work settings: transaction deadline and lock-retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitOfWorkConfig {
    /// Hard deadline for one transaction attempt; never retried
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Retries on lock contention before giving up
    pub max_lock_retries: u32,
    /// First backoff delay; doubles per retry
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
}

impl Default for UnitOfWorkConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_lock_retries: 3,
            base_delay: Duration::from_millis(25),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    /// IANA name of the fixed business timezone
    pub timezone: String,
    /// Response token lifetime
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,
    /// Grace accepted past nominal token expiry, applied at validation
    #[serde(with = "humantime_serde")]
    pub token_grace: Duration,
    pub rate_limit: RateLimitConfig,
    pub unit_of_work: UnitOfWorkConfig,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            token_ttl: Duration::from_secs(72 * 3600),
            token_grace: Duration::from_secs(15 * 60),
            rate_limit: RateLimitConfig::default(),
            unit_of_work: UnitOfWorkConfig::default(),
        }
    }
}

impl VenueConfig {
    /// Settings suitable for tests (tight timings, small limits)
    pub fn for_testing() -> Self {
        Self {
            timezone: "America/New_York".to_string(),
            token_ttl: Duration::from_secs(3600),
            token_grace: Duration::from_secs(600),
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(60),
                limit: 3,
                overrides: HashMap::new(),
            },
            unit_of_work: UnitOfWorkConfig {
                timeout: Duration::from_secs(2),
                max_lock_retries: 5,
                base_delay: Duration::from_millis(5),
            },
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// The configured business timezone
    pub fn timezone(&self) -> Result<Tz, ValidationError> {
        self.timezone
            .parse()
            .map_err(|_| ValidationError::InvalidTimezone(self.timezone.clone()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
