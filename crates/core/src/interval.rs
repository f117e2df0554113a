// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Half-open time intervals
//!
//! An interval `[start, end)` includes its start instant and excludes its
//! end instant. Two intervals conflict iff `s1 < e2 && s2 < e1`, so
//! back-to-back bookings that touch at a boundary do not conflict.

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// A half-open interval between two absolute instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval; the end is never before the start.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }

    /// Half-open overlap test. Symmetric; empty intervals never overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// An interval with equal endpoints covers no time
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Every calendar day the interval touches in the given timezone,
    /// inclusive of both endpoint days.
    pub fn days_touched(&self, tz: Tz) -> Vec<NaiveDate> {
        let first = self.start.with_timezone(&tz).date_naive();
        let last = self.end.with_timezone(&tz).date_naive();
        let mut days = Vec::new();
        let mut day = first;
        while day <= last {
            days.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        days
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Convenience for tests and projections: midnight-to-midnight UTC
pub fn utc_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
#[path = "interval_tests.rs"]
mod tests;
