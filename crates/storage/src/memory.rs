// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store with single-writer transactions
//!
//! Models the production store's locking behavior: one transaction holds
//! the write lock at a time, a contender observes [`StoreError::Busy`],
//! and writes are buffered until commit. Bucket operations are atomic
//! single calls outside the write lock, matching the limiter's
//! independent atomicity contract.
//!
//! Fault injection (`fail_next_*`) exists so fail-open policies can be
//! exercised in tests without a real outage.

use crate::store::{
    BucketKey, CreateOutcome, IncrementOutcome, Store, StoreError, StoreTx,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vk_core::{Booking, BookingId, StatusHistoryRecord};

#[derive(Default)]
struct Inner {
    bookings: HashMap<BookingId, Booking>,
    history: Vec<StatusHistoryRecord>,
    buckets: HashMap<BucketKey, u32>,
    /// Transaction id currently holding the write lock
    writer: Option<u64>,
    next_tx: u64,
}

#[derive(Default)]
struct Faults {
    begin: u32,
    list_blocking: u32,
    increment: u32,
    create: u32,
}

fn take_fault(counter: &mut u32) -> bool {
    if *counter > 0 {
        *counter -= 1;
        return true;
    }
    false
}

/// Shared in-memory store handle
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    faults: Arc<Mutex<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a committed booking directly, bypassing transactions
    pub fn seed_booking(&self, booking: Booking) {
        self.lock_inner().bookings.insert(booking.id, booking);
    }

    /// Number of committed bookings
    pub fn booking_count(&self) -> usize {
        self.lock_inner().bookings.len()
    }

    /// Fail the next `n` `begin` calls
    pub fn fail_next_begin(&self, n: u32) {
        self.lock_faults().begin = n;
    }

    /// Fail the next `n` blocking scans (in or out of a transaction)
    pub fn fail_next_list_blocking(&self, n: u32) {
        self.lock_faults().list_blocking = n;
    }

    /// Fail the next `n` conditional bucket increments
    pub fn fail_next_increment(&self, n: u32) {
        self.lock_faults().increment = n;
    }

    /// Fail the next `n` bucket creations
    pub fn fail_next_create(&self, n: u32) {
        self.lock_faults().create = n;
    }

    fn injected(&self, counter: fn(&mut Faults) -> &mut u32) -> bool {
        take_fault(counter(&mut self.lock_faults()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        if self.injected(|f| &mut f.begin) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        let id = {
            let mut inner = self.lock_inner();
            inner.next_tx += 1;
            inner.next_tx
        };
        Ok(MemoryTx {
            store: self.clone(),
            id,
            writes: Vec::new(),
            finished: false,
        })
    }

    async fn load_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.lock_inner().bookings.get(id).cloned())
    }

    async fn list_blocking(&self) -> Result<Vec<Booking>, StoreError> {
        if self.injected(|f| &mut f.list_blocking) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        Ok(self
            .lock_inner()
            .bookings
            .values()
            .filter(|b| b.is_blocking())
            .cloned()
            .collect())
    }

    async fn history(&self, id: &BookingId) -> Result<Vec<StatusHistoryRecord>, StoreError> {
        Ok(self
            .lock_inner()
            .history
            .iter()
            .filter(|r| r.booking_id == *id)
            .cloned()
            .collect())
    }

    async fn increment_if_below(
        &self,
        key: &BucketKey,
        limit: u32,
    ) -> Result<IncrementOutcome, StoreError> {
        if self.injected(|f| &mut f.increment) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        let mut inner = self.lock_inner();
        match inner.buckets.get_mut(key) {
            None => Ok(IncrementOutcome::Missing),
            Some(count) if *count < limit => {
                *count += 1;
                Ok(IncrementOutcome::Incremented { count: *count })
            }
            Some(_) => Ok(IncrementOutcome::AtLimit),
        }
    }

    async fn create_bucket(&self, key: &BucketKey) -> Result<CreateOutcome, StoreError> {
        if self.injected(|f| &mut f.create) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        let mut inner = self.lock_inner();
        if inner.buckets.contains_key(key) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        inner.buckets.insert(key.clone(), 1);
        Ok(CreateOutcome::Created)
    }

    async fn purge_buckets_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut inner = self.lock_inner();
        let before = inner.buckets.len();
        inner.buckets.retain(|key, _| key.window_start >= cutoff);
        Ok(before - inner.buckets.len())
    }
}

/// A buffered write applied at commit
#[derive(Debug, Clone)]
enum Write {
    Upsert(Booking),
    History(StatusHistoryRecord),
}

/// One in-flight transaction
pub struct MemoryTx {
    store: MemoryStore,
    id: u64,
    writes: Vec<Write>,
    finished: bool,
}

impl MemoryTx {
    /// Take or confirm the single write lock
    fn claim(&self, inner: &mut Inner) -> Result<(), StoreError> {
        match inner.writer {
            None => {
                inner.writer = Some(self.id);
                Ok(())
            }
            Some(owner) if owner == self.id => Ok(()),
            Some(_) => Err(StoreError::Busy),
        }
    }

    fn pending_booking(&self, id: &BookingId) -> Option<&Booking> {
        self.writes.iter().rev().find_map(|w| match w {
            Write::Upsert(b) if b.id == *id => Some(b),
            _ => None,
        })
    }

    fn release(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if !self.writes.is_empty() {
            tracing::debug!(tx = self.id, writes = self.writes.len(), "discarding buffered writes");
        }
        let mut inner = self.store.lock_inner();
        if inner.writer == Some(self.id) {
            inner.writer = None;
        }
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn load_booking(&mut self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        {
            let mut inner = self.store.lock_inner();
            self.claim(&mut inner)?;
            if let Some(pending) = self.pending_booking(id) {
                return Ok(Some(pending.clone()));
            }
            if let Some(committed) = inner.bookings.get(id) {
                return Ok(Some(committed.clone()));
            }
        }
        Ok(None)
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        let mut inner = self.store.lock_inner();
        self.claim(&mut inner)?;
        if inner.bookings.contains_key(&booking.id) || self.pending_booking(&booking.id).is_some()
        {
            return Err(StoreError::Corrupt(format!(
                "duplicate booking id: {}",
                booking.id
            )));
        }
        drop(inner);
        self.writes.push(Write::Upsert(booking.clone()));
        Ok(())
    }

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        let mut inner = self.store.lock_inner();
        self.claim(&mut inner)?;
        if !inner.bookings.contains_key(&booking.id) && self.pending_booking(&booking.id).is_none()
        {
            return Err(StoreError::Corrupt(format!(
                "update of unknown booking: {}",
                booking.id
            )));
        }
        drop(inner);
        self.writes.push(Write::Upsert(booking.clone()));
        Ok(())
    }

    async fn list_blocking(&mut self) -> Result<Vec<Booking>, StoreError> {
        if self.store.injected(|f| &mut f.list_blocking) {
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }
        let mut inner = self.store.lock_inner();
        self.claim(&mut inner)?;
        let mut merged: HashMap<BookingId, Booking> = inner.bookings.clone();
        drop(inner);
        for write in &self.writes {
            if let Write::Upsert(b) = write {
                merged.insert(b.id, b.clone());
            }
        }
        Ok(merged.into_values().filter(|b| b.is_blocking()).collect())
    }

    async fn append_history(&mut self, record: &StatusHistoryRecord) -> Result<(), StoreError> {
        let mut inner = self.store.lock_inner();
        self.claim(&mut inner)?;
        drop(inner);
        self.writes.push(Write::History(record.clone()));
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        let writes = std::mem::take(&mut self.writes);
        {
            let mut inner = self.store.lock_inner();
            // A transaction that never wrote holds no lock; claiming here
            // keeps commit atomic for read-modify-write callers.
            self.claim(&mut inner)?;
            for write in writes {
                match write {
                    Write::Upsert(booking) => {
                        inner.bookings.insert(booking.id, booking);
                    }
                    Write::History(record) => inner.history.push(record),
                }
            }
            if inner.writer == Some(self.id) {
                inner.writer = None;
            }
        }
        self.finished = true;
        Ok(())
    }

    async fn rollback(mut self) -> Result<(), StoreError> {
        self.release();
        Ok(())
    }
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        // A dropped transaction (e.g. a timed-out future) must not keep
        // the store locked or apply any writes.
        self.release();
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
