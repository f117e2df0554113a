// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-edge transition guards
//!
//! The transition table says which edges exist; guards say whether this
//! particular booking may take the edge right now. Guards run inside the
//! same transaction as the eventual write, so the overlap check and the
//! status update are one atomic unit.
//!
//! The overlap guard fails open: if the blocking scan errors for any
//! reason other than lock contention, the transition proceeds and the
//! bypass is counted. Contention propagates so the unit of work can
//! retry the whole attempt.

use crate::error::LifecycleError;
use crate::overlap::OverlapEngine;
use vk_adapters::Telemetry;
use vk_core::{Booking, BookingStatus, BusinessCalendar, Clock};
use vk_storage::{StoreError, StoreTx};

/// What a guard decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    /// The edge is refused for this booking under this context
    Deny { reason: String },
    /// The candidate interval collides with a blocking booking
    Conflict { reason: String },
}

/// Who is acting and under which overrides
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Recorded verbatim in the status history
    pub actor: String,
    /// Staff actions spend the booking's outstanding response token
    pub actor_is_staff: bool,
    pub is_admin: bool,
    /// Explicit override demanded by the finished-booking back-edge
    pub force: bool,
    /// Accept a request whose date already passed
    pub skip_date_check: bool,
    /// Disabled only by maintenance tooling that has checked elsewhere
    pub check_overlap: bool,
    pub reason: Option<String>,
}

impl TransitionContext {
    /// An external party acting through their response token
    pub fn customer(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            actor_is_staff: false,
            is_admin: false,
            force: false,
            skip_date_check: false,
            check_overlap: true,
            reason: None,
        }
    }

    pub fn staff(actor: impl Into<String>) -> Self {
        Self {
            actor_is_staff: true,
            ..Self::customer(actor)
        }
    }

    pub fn admin(actor: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::staff(actor)
        }
    }

    pub fn with_force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn skipping_date_check(mut self) -> Self {
        self.skip_date_check = true;
        self
    }

    pub fn without_overlap_check(mut self) -> Self {
        self.check_overlap = false;
        self
    }
}

/// Evaluate the guard for one legal edge.
///
/// Callers have already checked the edge against the transition table and
/// filtered out same-status no-ops.
pub async fn evaluate<Tx, C, T>(
    booking: &Booking,
    target: BookingStatus,
    ctx: &TransitionContext,
    tx: &mut Tx,
    overlap: &OverlapEngine<C>,
    telemetry: &T,
) -> Result<GuardOutcome, LifecycleError>
where
    Tx: StoreTx,
    C: Clock,
    T: Telemetry,
{
    use BookingStatus::{Cancelled, Confirmed, Finished, PaidDeposit, Pending, PendingDeposit};
    match (booking.status, target) {
        (Pending, PendingDeposit) => accept_guard(booking, ctx, overlap.calendar()),
        (Finished, Confirmed) => {
            if !(ctx.force && ctx.is_admin) {
                return Ok(GuardOutcome::Deny {
                    reason: "reopening a finished booking requires an administrator force override"
                        .to_string(),
                });
            }
            overlap_guard(booking, ctx, tx, overlap, telemetry).await
        }
        (_, Confirmed) => overlap_guard(booking, ctx, tx, overlap, telemetry).await,
        (Cancelled, PaidDeposit) => Ok(restore_paid_guard(booking)),
        (Confirmed, Finished) => finish_guard(booking, overlap.calendar()),
        _ => Ok(GuardOutcome::Allow),
    }
}

/// Accepting a request whose start already passed needs an explicit skip
fn accept_guard<C: Clock>(
    booking: &Booking,
    ctx: &TransitionContext,
    calendar: &BusinessCalendar<C>,
) -> Result<GuardOutcome, LifecycleError> {
    if ctx.skip_date_check {
        return Ok(GuardOutcome::Allow);
    }
    let interval = booking.candidate_schedule().interval(calendar)?;
    if interval.start < calendar.now() {
        return Ok(GuardOutcome::Deny {
            reason: "requested date is already in the past".to_string(),
        });
    }
    Ok(GuardOutcome::Allow)
}

/// A cancelled booking can only come back as paid once evidence exists
fn restore_paid_guard(booking: &Booking) -> GuardOutcome {
    if booking.has_deposit_evidence() {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Deny {
            reason: "restoring with deposit requires recorded deposit evidence".to_string(),
        }
    }
}

/// A booking only finishes once its interval has fully elapsed
fn finish_guard<C: Clock>(
    booking: &Booking,
    calendar: &BusinessCalendar<C>,
) -> Result<GuardOutcome, LifecycleError> {
    let interval = booking.schedule.interval(calendar)?;
    if interval.end > calendar.now() {
        return Ok(GuardOutcome::Deny {
            reason: "booking has not ended yet".to_string(),
        });
    }
    Ok(GuardOutcome::Allow)
}

/// Check the candidate interval against every blocking booking this
/// transaction sees, excluding the booking itself.
async fn overlap_guard<Tx, C, T>(
    booking: &Booking,
    ctx: &TransitionContext,
    tx: &mut Tx,
    overlap: &OverlapEngine<C>,
    telemetry: &T,
) -> Result<GuardOutcome, LifecycleError>
where
    Tx: StoreTx,
    C: Clock,
    T: Telemetry,
{
    if !ctx.check_overlap {
        return Ok(GuardOutcome::Allow);
    }
    let candidate = booking
        .candidate_schedule()
        .interval(overlap.calendar())?;
    match overlap.conflicts_tx(tx, candidate, Some(booking.id)).await {
        Ok(conflicts) if conflicts.any() => Ok(GuardOutcome::Conflict {
            reason: format!(
                "requested interval collides with {} existing booking(s)",
                conflicts.matches.len()
            ),
        }),
        Ok(_) => Ok(GuardOutcome::Allow),
        Err(StoreError::Busy) => Err(StoreError::Busy.into()),
        Err(err) => {
            tracing::warn!(booking = %booking.id, %err, "overlap scan failed; allowing transition");
            telemetry.overlap_fail_open();
            Ok(GuardOutcome::Allow)
        }
    }
}

#[cfg(test)]
#[path = "guards_tests.rs"]
mod tests;
