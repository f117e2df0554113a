// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle error taxonomy
//!
//! Callers need to tell apart "the table forbids this edge", "a guard
//! said no", and "the slot is taken", so each gets its own variant
//! instead of a shared string.

use chrono::{DateTime, Utc};
use thiserror::Error;
use vk_core::{BookingId, BookingStatus, IllegalTransition, ValidationError};
use vk_storage::StoreError;

/// Errors from lifecycle operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested edge is not in the transition table
    #[error(transparent)]
    Illegal(#[from] IllegalTransition),

    /// The edge is in the table but its guard refused
    #[error("transition {from} -> {to} denied: {reason}")]
    Denied {
        from: BookingStatus,
        to: BookingStatus,
        reason: String,
    },

    /// The candidate interval collides with a blocking booking
    #[error("booking conflict: {reason}")]
    Conflict { reason: String },

    #[error("booking not found: {0}")]
    NotFound(BookingId),

    /// Lock contention persisted through every retry
    #[error("could not acquire the write lock after {attempts} attempts")]
    LockTimeout { attempts: u32 },

    /// The transaction ran past its deadline and was rolled back
    #[error("transaction exceeded its deadline")]
    TransactionTimeout,

    #[error("rate limited; window resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LifecycleError {
    /// Whether this failure is lock contention the unit of work may retry
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, LifecycleError::Store(StoreError::Busy))
    }
}
