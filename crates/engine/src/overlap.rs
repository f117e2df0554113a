// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overlap detection against blocking bookings
//!
//! Blocking bookings contribute their canonical interval, never a pending
//! proposal. A stored schedule that no longer derives an interval (for
//! example a time that has fallen into a DST gap) degrades to date-only
//! granularity instead of making the whole scan fail; a schedule whose
//! date itself is broken is skipped with a warning.

use crate::error::LifecycleError;
use std::collections::BTreeSet;
use vk_core::{Booking, BookingId, BusinessCalendar, Clock, Interval, Schedule};
use vk_storage::{Store, StoreError, StoreTx};

/// Outcome of one overlap scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflicts {
    pub matches: Vec<BookingId>,
}

impl Conflicts {
    pub fn any(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// One blocking booking's claim on the calendar
#[derive(Debug, Clone)]
pub struct BlockedRange {
    pub booking_id: BookingId,
    pub schedule: Schedule,
    pub interval: Interval,
}

/// Calendar-level unavailability derived from all blocking bookings
#[derive(Debug, Clone)]
pub struct Unavailability {
    /// Every business-timezone day touched by a blocking interval
    pub dates: Vec<chrono::NaiveDate>,
    pub ranges: Vec<BlockedRange>,
}

/// Scans blocking bookings for interval collisions
#[derive(Clone)]
pub struct OverlapEngine<C: Clock> {
    calendar: BusinessCalendar<C>,
}

impl<C: Clock> OverlapEngine<C> {
    pub fn new(calendar: BusinessCalendar<C>) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &BusinessCalendar<C> {
        &self.calendar
    }

    /// Conflicts between `candidate` and the blocking bookings this
    /// transaction sees, excluding the booking being moved.
    pub async fn conflicts_tx<Tx: StoreTx>(
        &self,
        tx: &mut Tx,
        candidate: Interval,
        exclude: Option<BookingId>,
    ) -> Result<Conflicts, StoreError> {
        let blocking = tx.list_blocking().await?;
        Ok(self.conflicts_against(&blocking, candidate, exclude))
    }

    /// Conflicts against committed state, outside any transaction
    pub async fn conflicts<S: Store>(
        &self,
        store: &S,
        candidate: Interval,
        exclude: Option<BookingId>,
    ) -> Result<Conflicts, StoreError> {
        let blocking = store.list_blocking().await?;
        Ok(self.conflicts_against(&blocking, candidate, exclude))
    }

    fn conflicts_against(
        &self,
        blocking: &[Booking],
        candidate: Interval,
        exclude: Option<BookingId>,
    ) -> Conflicts {
        let matches = self
            .blocked_ranges(blocking, exclude)
            .into_iter()
            .filter(|range| range.interval.overlaps(&candidate))
            .map(|range| range.booking_id)
            .collect();
        Conflicts { matches }
    }

    /// Every day the calendar is unavailable, plus the ranges behind it.
    ///
    /// Includes days of empty (date-only) intervals: a date-only booking
    /// never collides with a timed one but its day is still taken.
    pub async fn unavailable_dates<S: Store>(
        &self,
        store: &S,
        exclude: Option<BookingId>,
    ) -> Result<Unavailability, LifecycleError> {
        let blocking = store.list_blocking().await?;
        let ranges = self.blocked_ranges(&blocking, exclude);
        let mut days = BTreeSet::new();
        for range in &ranges {
            days.extend(range.interval.days_touched(self.calendar.timezone()));
        }
        Ok(Unavailability {
            dates: days.into_iter().collect(),
            ranges,
        })
    }

    fn blocked_ranges(&self, blocking: &[Booking], exclude: Option<BookingId>) -> Vec<BlockedRange> {
        blocking
            .iter()
            .filter(|b| Some(b.id) != exclude)
            .filter_map(|b| self.attribute(b))
            .collect()
    }

    /// Derive the canonical interval of one blocking booking, degrading to
    /// date-only granularity when the stored times no longer resolve.
    fn attribute(&self, booking: &Booking) -> Option<BlockedRange> {
        match booking.schedule.interval(&self.calendar) {
            Ok(interval) => Some(BlockedRange {
                booking_id: booking.id,
                schedule: booking.schedule,
                interval,
            }),
            Err(err) => {
                tracing::warn!(
                    booking = %booking.id,
                    %err,
                    "stored schedule no longer resolves; degrading to date-only"
                );
                let date_only = Schedule {
                    start_time: None,
                    end_time: None,
                    ..booking.schedule
                };
                match date_only.interval(&self.calendar) {
                    Ok(interval) => Some(BlockedRange {
                        booking_id: booking.id,
                        schedule: date_only,
                        interval,
                    }),
                    Err(err) => {
                        tracing::warn!(booking = %booking.id, %err, "skipping unresolvable schedule");
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "overlap_tests.rs"]
mod tests;
