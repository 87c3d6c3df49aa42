// src/domain/wallet.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// Smallest amount a user may ask to redeem.
pub const MIN_REDEEM_AMOUNT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedeemStatus {
    Pending,
    Approved,
    Rejected,
}

impl RedeemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RedeemStatus::Pending => "pending",
            RedeemStatus::Approved => "approved",
            RedeemStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RedeemStatus::Pending),
            "approved" => Some(RedeemStatus::Approved),
            "rejected" => Some(RedeemStatus::Rejected),
            _ => None,
        }
    }

    /// `approve` / `reject` as sent by the panel.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "approve" => Some(RedeemStatus::Approved),
            "reject" => Some(RedeemStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub status: RedeemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Check a redeem request against the user's current balance.
pub fn check_redeemable(amount: i64, balance: i64) -> Result<(), ServerError> {
    if amount < MIN_REDEEM_AMOUNT {
        return Err(ServerError::validation(format!(
            "Minimum redeemable amount is {MIN_REDEEM_AMOUNT}."
        )));
    }
    if balance < amount {
        return Err(ServerError::validation("Insufficient balance."));
    }
    Ok(())
}
