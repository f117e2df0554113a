// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The booking lifecycle service
//!
//! One transition is one unit of work: load, table check, guard, write,
//! history append, commit. Guards run inside the same transaction as the
//! write, so two racing confirms cannot both pass the overlap check; the
//! loser observes contention, retries, and then sees the conflict.
//!
//! Notifications leave through the outbox after commit and never affect
//! the outcome of the transition that produced them.

use crate::error::LifecycleError;
use crate::guards::{self, GuardOutcome, TransitionContext};
use crate::outbox::{Outbox, OutboxConfig, OutboxHandle};
use crate::overlap::{OverlapEngine, Unavailability};
use crate::rate_limit::RateLimiter;
use crate::unit_of_work::UnitOfWork;
use uuid::Uuid;
use vk_adapters::{Notification, Notifier, Telemetry};
use vk_core::{
    available_actions, check_legal, Action, ActionDescriptor, ActionFlags, Booking, BookingId,
    BookingStatus, BusinessCalendar, Clock, Contact, RawSchedule, ResponseToken,
    StatusHistoryRecord, ValidationError, VenueConfig,
};
use vk_storage::{Store, StoreTx};

/// Rate-limit class for new booking requests
const CLASS_CREATE: &str = "create_request";
/// Rate-limit class for token-authenticated responses
const CLASS_RESPOND: &str = "token_response";

/// A new booking request from an external party
#[derive(Debug, Clone)]
pub struct NewBookingRequest {
    pub contact: Contact,
    pub schedule: RawSchedule,
    /// Rate-limit identity, e.g. the requester's email or remote address
    pub identity: String,
}

/// Drives bookings through their status lifecycle
#[derive(Clone)]
pub struct LifecycleService<S: Store, T: Telemetry, C: Clock> {
    store: S,
    config: VenueConfig,
    overlap: OverlapEngine<C>,
    uow: UnitOfWork<T>,
    limiter: RateLimiter<S, T, C>,
    outbox: OutboxHandle,
    clock: C,
    telemetry: T,
}

impl<S: Store, T: Telemetry, C: Clock> LifecycleService<S, T, C> {
    /// Build the service and start its outbox worker on the current runtime
    pub fn new<N: Notifier>(
        store: S,
        config: VenueConfig,
        notifier: N,
        telemetry: T,
        clock: C,
    ) -> Result<Self, ValidationError> {
        Self::with_outbox_config(store, config, notifier, telemetry, clock, OutboxConfig::default())
    }

    pub fn with_outbox_config<N: Notifier>(
        store: S,
        config: VenueConfig,
        notifier: N,
        telemetry: T,
        clock: C,
        outbox_config: OutboxConfig,
    ) -> Result<Self, ValidationError> {
        let calendar = BusinessCalendar::new(config.timezone()?, clock.clone());
        let overlap = OverlapEngine::new(calendar);
        let uow = UnitOfWork::new(config.unit_of_work.clone(), telemetry.clone());
        let limiter = RateLimiter::new(
            store.clone(),
            config.rate_limit.clone(),
            telemetry.clone(),
            clock.clone(),
        );
        let outbox = Outbox::spawn(notifier, telemetry.clone(), outbox_config);
        Ok(Self {
            store,
            config,
            overlap,
            uow,
            limiter,
            outbox,
            clock,
            telemetry,
        })
    }

    pub fn calendar(&self) -> &BusinessCalendar<C> {
        self.overlap.calendar()
    }

    /// Take in a new booking request, in the Pending status.
    ///
    /// Rate-limited per identity. The booking gets a response token the
    /// requester can later act through.
    pub async fn create_request(
        &self,
        request: NewBookingRequest,
    ) -> Result<Booking, LifecycleError> {
        let decision = self.limiter.try_consume(&request.identity, CLASS_CREATE).await;
        if !decision.allowed {
            return Err(LifecycleError::RateLimited {
                reset_at: decision.reset_at,
            });
        }

        let schedule = request.schedule.parse()?;
        let now = self.clock.now();
        let token = ResponseToken::issue(now, self.config.token_ttl);
        let booking = Booking::new(BookingId::new(), request.contact, schedule, Some(token), now);
        let record = StatusHistoryRecord {
            booking_id: booking.id,
            from: None,
            to: BookingStatus::Pending,
            actor: request.identity.clone(),
            reason: None,
            at: now,
        };

        let created = self
            .uow
            .run(&self.store, |tx| {
                let booking = booking.clone();
                let record = record.clone();
                Box::pin(async move {
                    tx.insert_booking(&booking).await?;
                    tx.append_history(&record).await?;
                    Ok(booking)
                })
            })
            .await?;

        tracing::info!(booking = %created.id, "booking request created");
        Ok(created)
    }

    /// Apply one status transition.
    ///
    /// A same-status request is a legal no-op: the booking comes back
    /// unchanged, nothing is written and nothing is notified.
    pub async fn apply_transition(
        &self,
        id: BookingId,
        target: BookingStatus,
        ctx: &TransitionContext,
    ) -> Result<Booking, LifecycleError> {
        let (booking, changed) = self
            .uow
            .run(&self.store, |tx| {
                let ctx = ctx.clone();
                let overlap = self.overlap.clone();
                let telemetry = self.telemetry.clone();
                let clock = self.clock.clone();
                Box::pin(async move {
                    let booking = tx
                        .load_booking(&id)
                        .await?
                        .ok_or(LifecycleError::NotFound(id))?;
                    let from = booking.status;
                    check_legal(from, target)?;
                    if from == target {
                        return Ok((booking, false));
                    }

                    match guards::evaluate(&booking, target, &ctx, tx, &overlap, &telemetry).await? {
                        GuardOutcome::Allow => {}
                        GuardOutcome::Deny { reason } => {
                            return Err(LifecycleError::Denied {
                                from,
                                to: target,
                                reason,
                            });
                        }
                        GuardOutcome::Conflict { reason } => {
                            return Err(LifecycleError::Conflict { reason });
                        }
                    }

                    let now = clock.now();
                    let mut updated = booking;
                    if promotes_proposal(from, target) {
                        updated.promote_proposal();
                    }
                    if ctx.actor_is_staff {
                        updated.token = None;
                    }
                    updated.status = target;
                    updated.updated_at = now;

                    tx.update_booking(&updated).await?;
                    tx.append_history(&StatusHistoryRecord {
                        booking_id: updated.id,
                        from: Some(from),
                        to: target,
                        actor: ctx.actor.clone(),
                        reason: ctx.reason.clone(),
                        at: now,
                    })
                    .await?;
                    Ok((updated, true))
                })
            })
            .await?;

        if changed {
            tracing::info!(booking = %booking.id, status = %booking.status, actor = %ctx.actor, "transition applied");
            self.outbox.enqueue(Notification {
                booking: booking.clone(),
                new_status: target,
                reason: ctx.reason.clone(),
            });
        }
        Ok(booking)
    }

    /// Apply a named admin action; the target status is fixed per action
    pub async fn apply_action(
        &self,
        id: BookingId,
        action: Action,
        ctx: &TransitionContext,
    ) -> Result<Booking, LifecycleError> {
        self.apply_transition(id, action.target(), ctx).await
    }

    /// Check a presented response token, with the configured grace period
    pub async fn verify_token(
        &self,
        id: BookingId,
        presented: Uuid,
    ) -> Result<Booking, LifecycleError> {
        let booking = self
            .store
            .load_booking(&id)
            .await?
            .ok_or(LifecycleError::NotFound(id))?;
        let token = booking.token.as_ref().ok_or(ValidationError::TokenMissing)?;
        token.verify(presented, self.clock.now(), self.config.token_grace)?;
        Ok(booking)
    }

    /// Apply a transition on behalf of the external party holding the token
    pub async fn respond_with_token(
        &self,
        id: BookingId,
        presented: Uuid,
        target: BookingStatus,
    ) -> Result<Booking, LifecycleError> {
        let booking = self.verify_token(id, presented).await?;
        let decision = self
            .limiter
            .try_consume(&booking.contact.email, CLASS_RESPOND)
            .await;
        if !decision.allowed {
            return Err(LifecycleError::RateLimited {
                reset_at: decision.reset_at,
            });
        }
        let ctx = TransitionContext::customer(booking.contact.email.clone());
        self.apply_transition(id, target, &ctx).await
    }

    /// Record deposit evidence on a booking
    pub async fn record_deposit(
        &self,
        id: BookingId,
        evidence: &str,
        actor: &str,
    ) -> Result<Booking, LifecycleError> {
        let updated = self
            .uow
            .run(&self.store, |tx| {
                let evidence = evidence.to_string();
                let clock = self.clock.clone();
                Box::pin(async move {
                    let mut booking = tx
                        .load_booking(&id)
                        .await?
                        .ok_or(LifecycleError::NotFound(id))?;
                    booking.deposit_evidence = Some(evidence);
                    booking.updated_at = clock.now();
                    tx.update_booking(&booking).await?;
                    Ok(booking)
                })
            })
            .await?;
        tracing::debug!(booking = %updated.id, actor, "deposit evidence recorded");
        Ok(updated)
    }

    /// Mark recorded deposit evidence as verified by staff
    pub async fn verify_deposit(&self, id: BookingId, actor: &str) -> Result<Booking, LifecycleError> {
        self.uow
            .run(&self.store, |tx| {
                let actor = actor.to_string();
                let clock = self.clock.clone();
                Box::pin(async move {
                    let mut booking = tx
                        .load_booking(&id)
                        .await?
                        .ok_or(LifecycleError::NotFound(id))?;
                    if !booking.has_deposit_evidence() {
                        return Err(ValidationError::MissingField("deposit_evidence").into());
                    }
                    let now = clock.now();
                    booking.deposit_verified_at = Some(now);
                    booking.deposit_verified_by = Some(actor);
                    booking.updated_at = now;
                    tx.update_booking(&booking).await?;
                    Ok(booking)
                })
            })
            .await
    }

    /// Record a proposed alternate schedule during renegotiation.
    ///
    /// The proposal never blocks the calendar; it becomes canonical when
    /// the booking is next accepted or confirmed.
    pub async fn propose_schedule(
        &self,
        id: BookingId,
        raw: &RawSchedule,
    ) -> Result<Booking, LifecycleError> {
        let schedule = raw.parse()?;
        self.uow
            .run(&self.store, |tx| {
                let clock = self.clock.clone();
                Box::pin(async move {
                    let mut booking = tx
                        .load_booking(&id)
                        .await?
                        .ok_or(LifecycleError::NotFound(id))?;
                    booking.propose(schedule)?;
                    booking.updated_at = clock.now();
                    tx.update_booking(&booking).await?;
                    Ok(booking)
                })
            })
            .await
    }

    /// The actions staff may invoke for this booking right now
    pub fn actions_for(&self, booking: &Booking, is_admin: bool) -> Vec<ActionDescriptor> {
        let calendar = self.overlap.calendar();
        let date_in_past = booking
            .candidate_schedule()
            .interval(calendar)
            .map(|interval| interval.start < calendar.now())
            .unwrap_or(false);
        available_actions(
            booking.status,
            ActionFlags {
                has_deposit_evidence: booking.has_deposit_evidence(),
                is_admin,
                date_in_past,
            },
        )
    }

    pub async fn load(&self, id: BookingId) -> Result<Option<Booking>, LifecycleError> {
        Ok(self.store.load_booking(&id).await?)
    }

    /// Status history of one booking, oldest first
    pub async fn history(&self, id: BookingId) -> Result<Vec<StatusHistoryRecord>, LifecycleError> {
        Ok(self.store.history(&id).await?)
    }

    /// Calendar unavailability for availability displays
    pub async fn unavailable_dates(
        &self,
        exclude: Option<BookingId>,
    ) -> Result<Unavailability, LifecycleError> {
        self.overlap.unavailable_dates(&self.store, exclude).await
    }

    /// Drop rate buckets from windows that already rolled over
    pub async fn purge_rate_buckets(&self) -> Result<usize, LifecycleError> {
        Ok(self.limiter.purge_expired().await?)
    }
}

/// Whether this edge makes a pending proposal canonical
fn promotes_proposal(from: BookingStatus, to: BookingStatus) -> bool {
    matches!(
        (from, to),
        (BookingStatus::Pending, BookingStatus::PendingDeposit)
    ) || to == BookingStatus::Confirmed
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
