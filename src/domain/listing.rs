// src/domain/listing.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::ServerError;

/// Which collection a listing belongs to. Rooms and hostels share one lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Room,
    Hostel,
}

impl ListingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingKind::Room => "room",
            ListingKind::Hostel => "hostel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "room" => Some(ListingKind::Room),
            "hostel" => Some(ListingKind::Hostel),
            _ => None,
        }
    }

    /// Capitalized noun for user-facing messages ("Room not found.").
    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Room => "Room",
            ListingKind::Hostel => "Hostel",
        }
    }

    /// Payload key carrying the price.
    pub fn price_key(self) -> &'static str {
        match self {
            ListingKind::Room => "rent",
            ListingKind::Hostel => "rentPerBed",
        }
    }

    /// Status a listing of this kind takes when it is taken off the market by a booking.
    pub fn occupied_status(self) -> ListingStatus {
        match self {
            ListingKind::Room => ListingStatus::Booked,
            ListingKind::Hostel => ListingStatus::Full,
        }
    }

    pub fn not_found(self) -> ServerError {
        ServerError::not_found(format!("{} not found.", self.label()))
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Available,
    Booked,
    Full,
    Rejected,
}

impl ListingStatus {
    pub const ALL: [ListingStatus; 5] = [
        ListingStatus::Pending,
        ListingStatus::Available,
        ListingStatus::Booked,
        ListingStatus::Full,
        ListingStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Available => "available",
            ListingStatus::Booked => "booked",
            ListingStatus::Full => "full",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GeoJSON point. Coordinates are always `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, ServerError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ServerError::validation("Longitude must be between -180 and 180."));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ServerError::validation("Latitude must be between -90 and 90."));
        }
        Ok(Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        })
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub coordinates: GeoPoint,
}

/// Serialized under the kind-specific key: `rent` or `rentPerBed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Price {
    #[serde(rename = "rent")]
    Rent(i64),
    #[serde(rename = "rentPerBed")]
    RentPerBed(i64),
}

impl Price {
    pub fn for_kind(kind: ListingKind, amount: i64) -> Self {
        match kind {
            ListingKind::Room => Price::Rent(amount),
            ListingKind::Hostel => Price::RentPerBed(amount),
        }
    }

    pub fn amount(self) -> i64 {
        match self {
            Price::Rent(a) | Price::RentPerBed(a) => a,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostelType {
    Boys,
    Girls,
    #[serde(rename = "Co-ed")]
    CoEd,
}

impl HostelType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Boys" => Some(HostelType::Boys),
            "Girls" => Some(HostelType::Girls),
            "Co-ed" => Some(HostelType::CoEd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facilities {
    #[serde(default)]
    pub food: bool,
    #[serde(default)]
    pub laundry: bool,
    #[serde(default)]
    pub cleaning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    pub bhk: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelDetails {
    pub hostel_type: HostelType,
    pub total_beds: u32,
    pub available_beds: u32,
    pub facilities: Facilities,
    pub show_reviews: bool,
    pub admin_rating: Option<f64>,
}

/// Variant-specific fields, flattened into the listing document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ListingDetails {
    Room(RoomDetails),
    Hostel(HostelDetails),
}

impl ListingDetails {
    pub fn from_json(kind: ListingKind, raw: &str) -> Result<Self, ServerError> {
        Ok(match kind {
            ListingKind::Room => ListingDetails::Room(serde_json::from_str(raw)?),
            ListingKind::Hostel => ListingDetails::Hostel(serde_json::from_str(raw)?),
        })
    }

    pub fn to_json(&self) -> Result<String, ServerError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub user_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable copy of a listing's prior field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub updated_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub description: String,
    pub location: Location,
    #[serde(flatten)]
    pub price: Price,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub availability_status: ListingStatus,
    /// Landlord user for rooms, panel member for hostels.
    pub owner_id: i64,
    pub views_count: i64,
    pub availability_date: DateTime<Utc>,
    pub bookmarks: Vec<i64>,
    pub feedbacks: Vec<Feedback>,
    pub history: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub details: ListingDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable part of a listing, as captured into history.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentView<'a> {
    title: &'a str,
    description: &'a str,
    location: &'a Location,
    #[serde(flatten)]
    price: &'a Price,
    amenities: &'a [String],
    images: &'a [String],
    availability_date: &'a DateTime<Utc>,
    #[serde(flatten)]
    details: &'a ListingDetails,
}

impl Listing {
    pub fn content_fields(&self) -> Result<Map<String, Value>, ServerError> {
        let view = ContentView {
            title: &self.title,
            description: &self.description,
            location: &self.location,
            price: &self.price,
            amenities: &self.amenities,
            images: &self.images,
            availability_date: &self.availability_date,
            details: &self.details,
        };
        match serde_json::to_value(view)? {
            Value::Object(map) => Ok(map),
            _ => Err(ServerError::InternalError),
        }
    }

    pub fn image_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "images".to_string(),
            Value::Array(self.images.iter().cloned().map(Value::String).collect()),
        );
        map
    }
}

/// Trim, drop blanks, and de-duplicate while keeping first-seen order.
pub fn normalize_amenities<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let a = item.as_ref().trim();
        if !a.is_empty() && !out.iter().any(|x| x == a) {
            out.push(a.to_string());
        }
    }
    out
}
