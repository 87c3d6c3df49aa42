// src/domain/interest.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::ListingKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    Visit,
    Book,
}

impl InterestType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterestType::Visit => "visit",
            InterestType::Book => "book",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visit" => Some(InterestType::Visit),
            "book" => Some(InterestType::Book),
            _ => None,
        }
    }
}

/// Workflow status an admin moves an interest through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl InterestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterestStatus::Pending => "pending",
            InterestStatus::InProgress => "in_progress",
            InterestStatus::Completed => "completed",
            InterestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InterestStatus::Pending),
            "in_progress" => Some(InterestStatus::InProgress),
            "completed" => Some(InterestStatus::Completed),
            "rejected" => Some(InterestStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub id: i64,
    pub user_id: i64,
    pub listing_id: i64,
    pub item_type: ListingKind,
    #[serde(rename = "type")]
    pub interest_type: InterestType,
    pub status: InterestStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
