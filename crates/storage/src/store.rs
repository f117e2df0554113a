// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store trait definitions
//!
//! `Store` is the handle shared by stateless request handlers; `StoreTx`
//! is one transaction scope. Everything a guard consults and everything a
//! transition writes goes through the same `StoreTx`, so the guard check
//! and the write share one atomic unit.
//!
//! Rate-limit buckets are an independent namespace with their own
//! single-call atomicity contract; bucket operations never take part in
//! booking transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use vk_core::{Booking, BookingId, StatusHistoryRecord};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row or table is locked by another transaction; retryable
    #[error("store is busy: locked by another transaction")]
    Busy,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Composite key of one rate-limit window bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub identity: String,
    pub class: String,
    pub window_start: DateTime<Utc>,
}

/// Result of a conditional bucket increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The count was below the limit and has been incremented
    Incremented { count: u32 },
    /// The bucket exists and is already at the limit
    AtLimit,
    /// No bucket exists for this key yet
    Missing,
}

/// Result of a bucket creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Created with count 1
    Created,
    /// A racing creator got there first
    AlreadyExists,
}

/// The authoritative store
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    type Tx: StoreTx;

    /// Open a transaction scope
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Read one booking outside any transaction (committed state)
    async fn load_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError>;

    /// Committed bookings that currently occupy calendar time
    async fn list_blocking(&self) -> Result<Vec<Booking>, StoreError>;

    /// Status history of one booking, oldest first
    async fn history(&self, id: &BookingId) -> Result<Vec<StatusHistoryRecord>, StoreError>;

    /// Atomically increment the bucket's count iff it is below `limit`
    async fn increment_if_below(
        &self,
        key: &BucketKey,
        limit: u32,
    ) -> Result<IncrementOutcome, StoreError>;

    /// Atomically create a bucket with count 1
    async fn create_bucket(&self, key: &BucketKey) -> Result<CreateOutcome, StoreError>;

    /// Drop buckets whose window started before `cutoff`; returns how many
    async fn purge_buckets_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// One transaction scope. Operations may return [`StoreError::Busy`] when
/// another transaction holds the write lock; the caller rolls back and
/// retries. Dropping an unfinished transaction releases its locks without
/// applying any writes.
#[async_trait]
pub trait StoreTx: Send {
    async fn load_booking(&mut self, id: &BookingId) -> Result<Option<Booking>, StoreError>;

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError>;

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), StoreError>;

    /// Blocking bookings as this transaction sees them (committed state
    /// plus this transaction's own pending writes)
    async fn list_blocking(&mut self) -> Result<Vec<Booking>, StoreError>;

    async fn append_history(&mut self, record: &StatusHistoryRecord) -> Result<(), StoreError>;

    /// Apply all writes atomically
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard all writes
    async fn rollback(self) -> Result<(), StoreError>;
}
