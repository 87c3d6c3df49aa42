// src/domain/support.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub issue_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: i64,
    pub name: String,
    pub mobile_no: String,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralCoordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralLocation {
    pub address: String,
    pub city: String,
    pub state: String,
    pub coordinates: ReferralCoordinates,
}

/// A renter pointing the team at a landlord who is not on the platform yet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: i64,
    pub referrer: i64,
    pub landlord_name: String,
    pub landlord_mobile_no: String,
    pub location: ReferralLocation,
    pub rent: Option<i64>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}
