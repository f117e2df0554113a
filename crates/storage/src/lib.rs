// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vk-storage: the authoritative store for bookings, history, and
//! rate-limit buckets
//!
//! All cross-handler correctness comes from the store's transactional
//! isolation; there is no in-process shared state between request
//! handlers. The in-memory implementation models the single-writer
//! locking of the production store: a contended transaction observes
//! `StoreError::Busy` and is expected to retry.

pub mod memory;
pub mod store;

pub use memory::{MemoryStore, MemoryTx};
pub use store::{
    BucketKey, CreateOutcome, IncrementOutcome, Store, StoreError, StoreTx,
};
