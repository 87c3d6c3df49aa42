// src/domain/status.rs

use std::fmt;

use crate::domain::listing::{ListingKind, ListingStatus};
use crate::errors::ServerError;

/// Explicit admin actions that move a listing between availability states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Approve,
    Reject,
    Book,
    Unbook,
}

impl StatusAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(StatusAction::Approve),
            "reject" => Some(StatusAction::Reject),
            "book" => Some(StatusAction::Book),
            "unbook" => Some(StatusAction::Unbook),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusAction::Approve => "approve",
            StatusAction::Reject => "reject",
            StatusAction::Book => "book",
            StatusAction::Unbook => "unbook",
        }
    }

    /// Past tense for response messages.
    pub fn done(self) -> &'static str {
        match self {
            StatusAction::Approve => "approved",
            StatusAction::Reject => "rejected",
            StatusAction::Book => "marked as booked",
            StatusAction::Unbook => "marked as available",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table:
///
/// - `pending -> available` (approve), `pending -> rejected` (reject)
/// - `available -> booked|full` (book; the occupied state depends on the kind)
/// - `* -> available` (unbook)
///
/// Transitions never touch history.
pub fn next_status(
    kind: ListingKind,
    current: ListingStatus,
    action: StatusAction,
) -> Result<ListingStatus, ServerError> {
    use ListingStatus::*;

    match (action, current) {
        (StatusAction::Approve, Pending) => Ok(Available),
        (StatusAction::Reject, Pending) => Ok(Rejected),
        (StatusAction::Book, Available) => Ok(kind.occupied_status()),
        (StatusAction::Unbook, _) => Ok(Available),
        _ => Err(ServerError::validation(format!(
            "Cannot {action} a {current} {kind}."
        ))),
    }
}
