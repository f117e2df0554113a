// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vk-core: Core library for the Venue Keeper (vk) booking system
//!
//! This crate provides:
//! - The closed booking status set and its transition table
//! - Booking value types with a typed schedule parsed once at the boundary
//! - Half-open time intervals and the business calendar (fixed timezone)
//! - Response tokens with grace-period validation
//! - The pure admin action surface
//! - Configuration loading

pub mod actions;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod interval;
pub mod status;
pub mod token;

// Re-exports
pub use actions::{available_actions, Action, ActionDescriptor, ActionFlags};
pub use booking::{Booking, BookingId, Contact, RawSchedule, Schedule};
pub use calendar::{parse_date, parse_time, BusinessCalendar};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{RateLimitConfig, UnitOfWorkConfig, VenueConfig};
pub use error::ValidationError;
pub use history::StatusHistoryRecord;
pub use interval::Interval;
pub use status::{check_legal, BookingStatus, IllegalTransition};
pub use token::ResponseToken;
