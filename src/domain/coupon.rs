// src/domain/coupon.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub discount_percent: f64,
    pub valid_till: DateTime<Utc>,
    pub min_rent: i64,
    /// Stored and validated on write; not decremented or enforced on apply.
    pub usage_limit: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields for create and full update.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponDraft {
    pub code: String,
    pub discount_percent: f64,
    pub valid_till: DateTime<Utc>,
    pub min_rent: i64,
    pub usage_limit: i64,
}

impl CouponDraft {
    pub fn validate(self) -> Result<Self, ServerError> {
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(ServerError::validation("Coupon code is required."));
        }
        if !(self.discount_percent > 0.0 && self.discount_percent <= 100.0) {
            return Err(ServerError::validation(
                "Discount percent must be greater than 0 and at most 100.",
            ));
        }
        if self.min_rent <= 0 {
            return Err(ServerError::validation("Minimum rent must be positive."));
        }
        if self.usage_limit <= 0 {
            return Err(ServerError::validation("Usage limit must be positive."));
        }
        Ok(Self { code, ..self })
    }
}

impl Coupon {
    /// Discount for `rent` at `now`. Checks expiry and the minimum rent only.
    pub fn discount_for(&self, rent: f64, now: DateTime<Utc>) -> Result<f64, ServerError> {
        if now > self.valid_till {
            return Err(ServerError::validation("Coupon has expired."));
        }
        if rent < self.min_rent as f64 {
            return Err(ServerError::validation(format!(
                "Minimum rent for this coupon is {}.",
                self.min_rent
            )));
        }
        Ok(rent * self.discount_percent / 100.0)
    }
}
