// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors for input parsing and value invariants

use thiserror::Error;

/// Errors from malformed input or violated value invariants
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid calendar date: {0}")]
    InvalidDate(String),
    #[error("invalid time of day: {0}")]
    InvalidTime(String),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("local time {value} does not exist in {tz}")]
    NonexistentLocalTime { tz: String, value: String },
    #[error("interval ends before it starts")]
    EndBeforeStart,
    #[error("response token does not match")]
    TokenMismatch,
    #[error("response token has expired")]
    TokenExpired,
    #[error("booking has no response token")]
    TokenMissing,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
