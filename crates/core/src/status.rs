// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking status set and the static transition table
//!
//! The status set is closed. Legal edges are fixed at compile time; a
//! transition to the same status is always legal and treated as a no-op
//! by callers. Guards for individual edges live in vk-engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Request received, awaiting staff approval
    Pending,
    /// Approved, awaiting deposit
    PendingDeposit,
    /// Deposit evidence verified
    PaidDeposit,
    /// Booking holds the venue for its interval
    Confirmed,
    /// Cancelled; restorable along guarded edges
    Cancelled,
    /// Event has taken place
    Finished,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::PendingDeposit,
        BookingStatus::PaidDeposit,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Finished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::PendingDeposit => "pending_deposit",
            BookingStatus::PaidDeposit => "paid_deposit",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Finished => "finished",
        }
    }

    /// Legal target statuses from this status, excluding the implicit
    /// same-status no-op.
    pub fn allowed_targets(self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => {
                &[BookingStatus::PendingDeposit, BookingStatus::Cancelled]
            }
            BookingStatus::PendingDeposit => {
                &[BookingStatus::Confirmed, BookingStatus::Cancelled]
            }
            BookingStatus::PaidDeposit => &[
                BookingStatus::Confirmed,
                BookingStatus::PendingDeposit,
                BookingStatus::Cancelled,
            ],
            BookingStatus::Confirmed => {
                &[BookingStatus::Finished, BookingStatus::Cancelled]
            }
            // Restoration edges, each guarded in vk-engine
            BookingStatus::Cancelled => &[
                BookingStatus::PendingDeposit,
                BookingStatus::PaidDeposit,
                BookingStatus::Confirmed,
            ],
            // Administrator force-override only
            BookingStatus::Finished => &[BookingStatus::Confirmed],
        }
    }

    /// Check if this status is terminal apart from its override back-edges
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Finished)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition outside the table
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot move from {from} to {to}; allowed: {allowed}")]
pub struct IllegalTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
    /// Human-readable list of legal targets, for caller display
    pub allowed: String,
}

/// Check whether a transition is in the table.
///
/// Same-status transitions are always legal. The error reason enumerates
/// the allowed set so callers can surface it verbatim.
pub fn check_legal(from: BookingStatus, to: BookingStatus) -> Result<(), IllegalTransition> {
    if from == to || from.allowed_targets().contains(&to) {
        return Ok(());
    }
    Err(IllegalTransition {
        from,
        to,
        allowed: format_allowed(from),
    })
}

fn format_allowed(from: BookingStatus) -> String {
    let targets = from.allowed_targets();
    if targets.is_empty() {
        return format!("{from} (no-op) only");
    }
    let names: Vec<&str> = targets.iter().map(|s| s.as_str()).collect();
    names.join(", ")
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
