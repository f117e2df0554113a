// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking value types
//!
//! A booking's schedule is parsed from its raw string form exactly once,
//! at the store/input boundary. Downstream code only ever sees the typed
//! `Schedule` and intervals derived from it.

use crate::calendar::{parse_date, parse_time, BusinessCalendar};
use crate::clock::Clock;
use crate::error::ValidationError;
use crate::interval::Interval;
use crate::status::BookingStatus;
use crate::token::ResponseToken;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub Uuid);

impl BookingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contact details for the requesting party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A typed schedule: start date, optional end date, optional times of day.
///
/// No end date means a single-day booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl Schedule {
    pub fn single_day(
        start_date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            start_date,
            end_date: None,
            start_time,
            end_time,
        }
    }

    /// The end date, defaulting to the start date for single-day bookings
    pub fn effective_end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    /// The end never precedes the start
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.effective_end_date() < self.start_date {
            return Err(ValidationError::EndBeforeStart);
        }
        if self.end_date.is_none() || self.end_date == Some(self.start_date) {
            if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
                if end < start {
                    return Err(ValidationError::EndBeforeStart);
                }
            }
        }
        Ok(())
    }

    /// Derive the canonical half-open interval.
    ///
    /// The start combines the start date with the start time, or
    /// start-of-day. The end combines the effective end date with the end
    /// time, or the start time, or start-of-day, so a booking without
    /// times derives an empty interval on its day.
    pub fn interval<C: Clock>(
        &self,
        calendar: &BusinessCalendar<C>,
    ) -> Result<Interval, ValidationError> {
        let start = calendar.instant(self.start_date, self.start_time)?;
        let end_time = self.end_time.or(self.start_time);
        let end = calendar.instant(self.effective_end_date(), end_time)?;
        Interval::new(start, end)
    }
}

/// The raw boundary shape of a schedule, as stored or submitted.
///
/// Dates must parse; malformed times of day degrade to date-only
/// granularity instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchedule {
    pub start_date: String,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl RawSchedule {
    /// Parse into a typed schedule, exactly once
    pub fn parse(&self) -> Result<Schedule, ValidationError> {
        let schedule = Schedule {
            start_date: parse_date(&self.start_date)?,
            end_date: self.end_date.as_deref().map(parse_date).transpose()?,
            start_time: lossy_time("start_time", self.start_time.as_deref()),
            end_time: lossy_time("end_time", self.end_time.as_deref()),
        };
        schedule.validate()?;
        Ok(schedule)
    }
}

fn lossy_time(field: &'static str, value: Option<&str>) -> Option<NaiveTime> {
    let raw = value?;
    match parse_time(raw) {
        Ok(time) => Some(time),
        Err(_) => {
            tracing::warn!(field, value = raw, "ignoring malformed time of day");
            None
        }
    }
}

/// A venue booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub contact: Contact,
    /// Canonical schedule; the only one that ever blocks the calendar
    pub schedule: Schedule,
    /// Alternate schedule proposed during renegotiation, pending agreement
    pub proposed: Option<Schedule>,
    pub status: BookingStatus,
    /// Outstanding response token, cleared once staff act
    pub token: Option<ResponseToken>,
    /// Reference to deposit evidence (receipt id, upload key, ...)
    pub deposit_evidence: Option<String>,
    pub deposit_verified_at: Option<DateTime<Utc>>,
    pub deposit_verified_by: Option<String>,
    pub fee_cents: Option<i64>,
    pub fee_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new booking in the Pending status
    pub fn new(
        id: BookingId,
        contact: Contact,
        schedule: Schedule,
        token: Option<ResponseToken>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            contact,
            schedule,
            proposed: None,
            status: BookingStatus::Pending,
            token,
            deposit_evidence: None,
            deposit_verified_at: None,
            deposit_verified_by: None,
            fee_cents: None,
            fee_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this booking currently occupies calendar time.
    ///
    /// Confirmed and paid-deposit bookings always block. A booking moved
    /// back to pending-deposit keeps blocking its canonical interval when
    /// its prior deposit was already verified (renegotiation); the
    /// proposed schedule never blocks until promoted.
    pub fn is_blocking(&self) -> bool {
        match self.status {
            BookingStatus::Confirmed | BookingStatus::PaidDeposit => true,
            BookingStatus::PendingDeposit => self.deposit_verified_at.is_some(),
            _ => false,
        }
    }

    /// The schedule a guard should evaluate: the proposal when one is
    /// pending agreement, otherwise the canonical schedule.
    pub fn candidate_schedule(&self) -> Schedule {
        self.proposed.unwrap_or(self.schedule)
    }

    /// Record a proposed alternate schedule
    pub fn propose(&mut self, schedule: Schedule) -> Result<(), ValidationError> {
        schedule.validate()?;
        self.proposed = Some(schedule);
        Ok(())
    }

    /// Promote the proposed schedule to canonical, clearing the proposal
    pub fn promote_proposal(&mut self) {
        if let Some(proposed) = self.proposed.take() {
            self.schedule = proposed;
        }
    }

    pub fn has_deposit_evidence(&self) -> bool {
        self.deposit_evidence.is_some()
    }
}

#[cfg(test)]
#[path = "booking_tests.rs"]
mod tests;
