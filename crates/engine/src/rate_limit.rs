// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-window rate limiter over store-side atomic buckets
//!
//! A bucket is keyed by (identity, operation class, window start) and only
//! ever changed by two atomic store calls: a conditional increment and a
//! create-if-absent. Concurrent callers therefore admit at most
//! min(N, limit) requests per window, whatever the interleaving.
//!
//! Store failure fails open: admission is availability-biased and every
//! bypass is counted.

use chrono::{DateTime, Utc};
use vk_adapters::Telemetry;
use vk_core::{Clock, RateLimitConfig};
use vk_storage::{BucketKey, CreateOutcome, IncrementOutcome, Store, StoreError};

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in this window; zero when denied or failed open
    pub remaining: u32,
    /// When the current window rolls over
    pub reset_at: DateTime<Utc>,
}

/// Fixed-window limiter shared by all request handlers
#[derive(Clone)]
pub struct RateLimiter<S: Store, T: Telemetry, C: Clock> {
    store: S,
    config: RateLimitConfig,
    telemetry: T,
    clock: C,
}

impl<S: Store, T: Telemetry, C: Clock> RateLimiter<S, T, C> {
    pub fn new(store: S, config: RateLimitConfig, telemetry: T, clock: C) -> Self {
        Self {
            store,
            config,
            telemetry,
            clock,
        }
    }

    /// Try to admit one request for `identity` under `class`.
    ///
    /// Increment first; only when no bucket exists yet, create one, and if
    /// a racing creator won, increment the winner's bucket instead. Each
    /// step is a single atomic store call.
    pub async fn try_consume(&self, identity: &str, class: &str) -> RateDecision {
        let limit = self.config.limit_for(class);
        let window_start = self.window_start(self.clock.now());
        let reset_at = window_start + chrono::Duration::from_std(self.config.window).unwrap_or_default();
        if limit == 0 {
            self.telemetry.rate_limit_hit();
            return self.denied(identity, class, reset_at);
        }
        let key = BucketKey {
            identity: identity.to_string(),
            class: class.to_string(),
            window_start,
        };

        match self.store.increment_if_below(&key, limit).await {
            Ok(IncrementOutcome::Incremented { count }) => RateDecision {
                allowed: true,
                remaining: limit.saturating_sub(count),
                reset_at,
            },
            Ok(IncrementOutcome::AtLimit) => {
                self.telemetry.rate_limit_hit();
                self.denied(identity, class, reset_at)
            }
            Ok(IncrementOutcome::Missing) => self.create_or_follow(&key, limit, reset_at).await,
            Err(err) => self.fail_open(err, reset_at),
        }
    }

    async fn create_or_follow(
        &self,
        key: &BucketKey,
        limit: u32,
        reset_at: DateTime<Utc>,
    ) -> RateDecision {
        match self.store.create_bucket(key).await {
            Ok(CreateOutcome::Created) => RateDecision {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_at,
            },
            Ok(CreateOutcome::AlreadyExists) => {
                // Lost the creation race; count against the winner's bucket
                match self.store.increment_if_below(key, limit).await {
                    Ok(IncrementOutcome::Incremented { count }) => RateDecision {
                        allowed: true,
                        remaining: limit.saturating_sub(count),
                        reset_at,
                    },
                    Ok(IncrementOutcome::AtLimit) => {
                        self.telemetry.rate_limit_hit();
                        self.denied(&key.identity, &key.class, reset_at)
                    }
                    Ok(IncrementOutcome::Missing) => {
                        // The bucket vanished between calls (purge race)
                        tracing::warn!(identity = %key.identity, "rate bucket vanished; admitting");
                        self.telemetry.rate_limit_bypass();
                        RateDecision {
                            allowed: true,
                            remaining: 0,
                            reset_at,
                        }
                    }
                    Err(err) => self.fail_open(err, reset_at),
                }
            }
            Err(err) => self.fail_open(err, reset_at),
        }
    }

    fn denied(&self, identity: &str, class: &str, reset_at: DateTime<Utc>) -> RateDecision {
        tracing::info!(identity, class, %reset_at, "rate limited");
        RateDecision {
            allowed: false,
            remaining: 0,
            reset_at,
        }
    }

    fn fail_open(&self, err: StoreError, reset_at: DateTime<Utc>) -> RateDecision {
        tracing::warn!(%err, "rate limiter store failure; admitting");
        self.telemetry.rate_limit_bypass();
        RateDecision {
            allowed: true,
            remaining: 0,
            reset_at,
        }
    }

    /// Floor the instant to the start of its fixed window
    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let len = i64::try_from(self.config.window.as_secs()).unwrap_or(i64::MAX).max(1);
        let ts = now.timestamp();
        DateTime::from_timestamp(ts - ts.rem_euclid(len), 0).unwrap_or(now)
    }

    /// Drop buckets from windows that already rolled over
    pub async fn purge_expired(&self) -> Result<usize, StoreError> {
        let cutoff = self.window_start(self.clock.now());
        let purged = self.store.purge_buckets_before(cutoff).await?;
        if purged > 0 {
            tracing::debug!(purged, "dropped expired rate buckets");
        }
        Ok(purged)
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
