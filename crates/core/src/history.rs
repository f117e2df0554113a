// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only status history

use crate::booking::BookingId;
use crate::status::BookingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applied transition. Never mutated or deleted while its booking
/// exists; `from` is None for the creation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryRecord {
    pub booking_id: BookingId,
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    pub actor: String,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}
