// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Business calendar: dates and times in one fixed timezone
//!
//! All business-rule date decisions go through this component so the host
//! machine's local timezone never leaks into a decision. A (date, optional
//! time-of-day) pair is canonicalized into a timezone-independent instant
//! exactly once; calendar-invalid dates are rejected rather than
//! normalized.

use crate::clock::Clock;
use crate::error::ValidationError;
use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse a strict `YYYY-MM-DD` date, rejecting calendar-invalid values
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Parse a strict `HH:MM` 24-hour time of day
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ValidationError::InvalidTime(value.to_string()))
}

/// The venue's calendar in its fixed business timezone
#[derive(Debug, Clone)]
pub struct BusinessCalendar<C: Clock> {
    tz: Tz,
    clock: C,
}

impl<C: Clock> BusinessCalendar<C> {
    pub fn new(tz: Tz, clock: C) -> Self {
        Self { tz, clock }
    }

    /// Build from an IANA timezone name, e.g. `"America/New_York"`
    pub fn from_name(name: &str, clock: C) -> Result<Self, ValidationError> {
        let tz: Tz = name
            .parse()
            .map_err(|_| ValidationError::InvalidTimezone(name.to_string()))?;
        Ok(Self::new(tz, clock))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Canonicalize a local (date, optional time) into an instant.
    ///
    /// A missing time means start-of-day. Ambiguous local times (fall-back)
    /// resolve to the earlier instant; times inside a spring-forward gap
    /// are rejected.
    pub fn instant(
        &self,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<DateTime<Utc>, ValidationError> {
        let local = date.and_time(time.unwrap_or(NaiveTime::MIN));
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
            LocalResult::None => Err(ValidationError::NonexistentLocalTime {
                tz: self.tz.to_string(),
                value: local.to_string(),
            }),
        }
    }

    /// String form of [`instant`](Self::instant): `YYYY-MM-DD` plus
    /// optional `HH:MM`.
    pub fn instant_str(
        &self,
        date: &str,
        time: Option<&str>,
    ) -> Result<DateTime<Utc>, ValidationError> {
        let date = parse_date(date)?;
        let time = time.map(parse_time).transpose()?;
        self.instant(date, time)
    }

    /// The current instant
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Today's date in the business timezone
    pub fn today(&self) -> NaiveDate {
        self.day_of(self.clock.now())
    }

    /// The business-timezone calendar day an instant falls on
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
