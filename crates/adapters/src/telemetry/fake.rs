// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake telemetry for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::Telemetry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fake telemetry backed by atomic counters
#[derive(Clone, Default)]
pub struct FakeTelemetry {
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    lock_conflicts: AtomicU64,
    retries: AtomicU64,
    rate_limit_hits: AtomicU64,
    rate_limit_bypasses: AtomicU64,
    tx_failures: AtomicU64,
    notify_failures: AtomicU64,
    overlap_fail_opens: AtomicU64,
}

impl FakeTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_conflicts(&self) -> u64 {
        self.counters.lock_conflicts.load(Ordering::SeqCst)
    }

    pub fn retries(&self) -> u64 {
        self.counters.retries.load(Ordering::SeqCst)
    }

    pub fn rate_limit_hits(&self) -> u64 {
        self.counters.rate_limit_hits.load(Ordering::SeqCst)
    }

    pub fn rate_limit_bypasses(&self) -> u64 {
        self.counters.rate_limit_bypasses.load(Ordering::SeqCst)
    }

    pub fn tx_failures(&self) -> u64 {
        self.counters.tx_failures.load(Ordering::SeqCst)
    }

    pub fn notify_failures(&self) -> u64 {
        self.counters.notify_failures.load(Ordering::SeqCst)
    }

    pub fn overlap_fail_opens(&self) -> u64 {
        self.counters.overlap_fail_opens.load(Ordering::SeqCst)
    }
}

impl Telemetry for FakeTelemetry {
    fn lock_conflict(&self) {
        self.counters.lock_conflicts.fetch_add(1, Ordering::SeqCst);
    }
    fn retry(&self) {
        self.counters.retries.fetch_add(1, Ordering::SeqCst);
    }
    fn rate_limit_hit(&self) {
        self.counters.rate_limit_hits.fetch_add(1, Ordering::SeqCst);
    }
    fn rate_limit_bypass(&self) {
        self.counters
            .rate_limit_bypasses
            .fetch_add(1, Ordering::SeqCst);
    }
    fn tx_failure(&self) {
        self.counters.tx_failures.fetch_add(1, Ordering::SeqCst);
    }
    fn notify_failure(&self) {
        self.counters.notify_failures.fetch_add(1, Ordering::SeqCst);
    }
    fn overlap_fail_open(&self) {
        self.counters
            .overlap_fail_opens
            .fetch_add(1, Ordering::SeqCst);
    }
}
