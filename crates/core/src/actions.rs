// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure admin action surface
//!
//! Maps a booking's current status plus contextual flags to the actions
//! staff may invoke. Each action targets one fixed status regardless of
//! the current status or context; availability is what varies.

use crate::status::BookingStatus;
use serde::{Deserialize, Serialize};

/// An admin-invocable action identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Accept,
    Confirm,
    RequestNewDeposit,
    Finish,
    Cancel,
    RestorePendingDeposit,
    RestorePaidDeposit,
    RestoreConfirmed,
    Reopen,
}

impl Action {
    /// The fixed target status of this action, independent of the current
    /// status.
    pub fn target(self) -> BookingStatus {
        match self {
            Action::Accept => BookingStatus::PendingDeposit,
            Action::Confirm => BookingStatus::Confirmed,
            Action::RequestNewDeposit => BookingStatus::PendingDeposit,
            Action::Finish => BookingStatus::Finished,
            Action::Cancel => BookingStatus::Cancelled,
            Action::RestorePendingDeposit => BookingStatus::PendingDeposit,
            Action::RestorePaidDeposit => BookingStatus::PaidDeposit,
            Action::RestoreConfirmed => BookingStatus::Confirmed,
            Action::Reopen => BookingStatus::Confirmed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::Accept => "Accept request",
            Action::Confirm => "Confirm booking",
            Action::RequestNewDeposit => "Request new deposit",
            Action::Finish => "Mark finished",
            Action::Cancel => "Cancel booking",
            Action::RestorePendingDeposit => "Restore awaiting deposit",
            Action::RestorePaidDeposit => "Restore with deposit",
            Action::RestoreConfirmed => "Restore confirmed",
            Action::Reopen => "Reopen finished booking",
        }
    }
}

/// Contextual booleans the action surface depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionFlags {
    pub has_deposit_evidence: bool,
    pub is_admin: bool,
    pub date_in_past: bool,
}

/// One available action with its display metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub action: Action,
    pub target: BookingStatus,
    pub label: &'static str,
    /// The UI should ask before invoking
    pub requires_confirmation: bool,
    /// The transition guard demands an explicit force flag
    pub requires_force: bool,
}

fn descriptor(action: Action, requires_confirmation: bool, requires_force: bool) -> ActionDescriptor {
    ActionDescriptor {
        action,
        target: action.target(),
        label: action.label(),
        requires_confirmation,
        requires_force,
    }
}

/// Actions invocable for a booking in `status` under `flags`
pub fn available_actions(status: BookingStatus, flags: ActionFlags) -> Vec<ActionDescriptor> {
    match status {
        BookingStatus::Pending => vec![
            // Accepting a past-dated request needs an explicit override
            descriptor(Action::Accept, flags.date_in_past, false),
            descriptor(Action::Cancel, false, false),
        ],
        BookingStatus::PendingDeposit => vec![
            descriptor(Action::Confirm, false, false),
            descriptor(Action::Cancel, false, false),
        ],
        BookingStatus::PaidDeposit => vec![
            descriptor(Action::Confirm, false, false),
            descriptor(Action::RequestNewDeposit, true, false),
            descriptor(Action::Cancel, true, false),
        ],
        BookingStatus::Confirmed => vec![
            descriptor(Action::Finish, false, false),
            descriptor(Action::Cancel, true, false),
        ],
        BookingStatus::Cancelled => {
            let mut actions = vec![descriptor(Action::RestorePendingDeposit, false, false)];
            if flags.has_deposit_evidence {
                actions.push(descriptor(Action::RestorePaidDeposit, false, false));
            }
            actions.push(descriptor(Action::RestoreConfirmed, true, false));
            actions
        }
        BookingStatus::Finished => {
            if flags.is_admin {
                vec![descriptor(Action::Reopen, true, true)]
            } else {
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
