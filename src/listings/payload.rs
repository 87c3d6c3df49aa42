// src/listings/payload.rs
//
// Reading listing fields out of create and update bodies.

use chrono::{DateTime, Utc};

use crate::domain::listing::{
    normalize_amenities, Facilities, GeoPoint, HostelDetails, HostelType, Listing, ListingDetails,
    ListingKind, Location, Price, RoomDetails,
};
use crate::errors::ServerError;
use crate::payload::{
    opt_bool, opt_date, opt_f64, opt_i64, opt_object, opt_str, opt_string_list, req_f64, req_i64,
    req_str, Payload,
};

/// Everything needed to create a listing except images, owner and status.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub location: Location,
    pub price: Price,
    pub amenities: Vec<String>,
    pub availability_date: DateTime<Utc>,
    pub details: ListingDetails,
}

fn availability_date(p: &Payload) -> Result<Option<DateTime<Utc>>, ServerError> {
    // Older clients misspell the key.
    match opt_date(p, "availabilityDate")? {
        Some(d) => Ok(Some(d)),
        None => opt_date(p, "availabiltyDate"),
    }
}

fn price(p: &Payload, kind: ListingKind, required: bool) -> Result<Option<Price>, ServerError> {
    let key = kind.price_key();
    let amount = if required {
        Some(req_i64(p, key)?)
    } else {
        opt_i64(p, key)?
    };
    match amount {
        Some(a) if a <= 0 => Err(ServerError::validation(format!("{key} must be positive."))),
        Some(a) => Ok(Some(Price::for_kind(kind, a))),
        None => Ok(None),
    }
}

fn hostel_type(p: &Payload) -> Result<Option<HostelType>, ServerError> {
    match opt_str(p, "hostelType")? {
        None => Ok(None),
        Some(s) => HostelType::parse(&s)
            .map(Some)
            .ok_or_else(|| ServerError::validation("hostelType must be Boys, Girls or Co-ed.")),
    }
}

fn beds(p: &Payload, key: &str) -> Result<Option<u32>, ServerError> {
    match opt_i64(p, key)? {
        None => Ok(None),
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| ServerError::validation(format!("{key} must not be negative."))),
    }
}

fn admin_rating(p: &Payload) -> Result<Option<f64>, ServerError> {
    match opt_f64(p, "adminRating")? {
        Some(r) if !(1.0..=5.0).contains(&r) => {
            Err(ServerError::validation("adminRating must be between 1 and 5."))
        }
        r => Ok(r),
    }
}

fn merge_facilities(current: &mut Facilities, p: &Payload) -> Result<(), ServerError> {
    if let Some(f) = opt_object(p, "facilities")? {
        if let Some(v) = opt_bool(&f, "food")? {
            current.food = v;
        }
        if let Some(v) = opt_bool(&f, "laundry")? {
            current.laundry = v;
        }
        if let Some(v) = opt_bool(&f, "cleaning")? {
            current.cleaning = v;
        }
    }
    Ok(())
}

fn check_beds(d: &HostelDetails) -> Result<(), ServerError> {
    if d.total_beds == 0 {
        return Err(ServerError::validation("totalBeds must be positive."));
    }
    if d.available_beds > d.total_beds {
        return Err(ServerError::validation("availableBeds cannot exceed totalBeds."));
    }
    Ok(())
}

pub fn draft_from(kind: ListingKind, p: &Payload, now: DateTime<Utc>) -> Result<ListingDraft, ServerError> {
    let title = req_str(p, "title")?;
    let address = req_str(p, "address")?;
    let city = req_str(p, "city")?;
    let state = req_str(p, "state")?;
    let latitude = req_f64(p, "latitude")?;
    let longitude = req_f64(p, "longitude")?;
    let coordinates = GeoPoint::new(longitude, latitude)?;
    let price = price(p, kind, true)?.ok_or(ServerError::InternalError)?;

    let details = match kind {
        ListingKind::Room => ListingDetails::Room(RoomDetails {
            bhk: opt_str(p, "bhk")?.unwrap_or_default(),
        }),
        ListingKind::Hostel => {
            let hostel_type =
                hostel_type(p)?.ok_or_else(|| ServerError::validation("hostelType is required."))?;
            let total_beds =
                beds(p, "totalBeds")?.ok_or_else(|| ServerError::validation("totalBeds is required."))?;
            let available_beds = beds(p, "availableBeds")?
                .ok_or_else(|| ServerError::validation("availableBeds is required."))?;

            let mut facilities = Facilities::default();
            merge_facilities(&mut facilities, p)?;

            let d = HostelDetails {
                hostel_type,
                total_beds,
                available_beds,
                facilities,
                show_reviews: opt_bool(p, "showReviews")?.unwrap_or(false),
                admin_rating: admin_rating(p)?,
            };
            check_beds(&d)?;
            ListingDetails::Hostel(d)
        }
    };

    Ok(ListingDraft {
        title,
        description: opt_str(p, "description")?.unwrap_or_default(),
        location: Location {
            address,
            city,
            state,
            coordinates,
        },
        price,
        amenities: normalize_amenities(opt_string_list(p, "amenities")?.unwrap_or_default()),
        availability_date: availability_date(p)?.unwrap_or(now),
        details,
    })
}

/// Apply the content keys present in `p`. Status, images, history, views,
/// bookmarks and feedback are not editable here and are ignored.
pub fn apply_patch(l: &mut Listing, p: &Payload) -> Result<(), ServerError> {
    if let Some(v) = opt_str(p, "title")? {
        l.title = v;
    }
    if p.contains_key("description") {
        l.description = opt_str(p, "description")?.unwrap_or_default();
    }
    if let Some(v) = opt_str(p, "address")? {
        l.location.address = v;
    }
    if let Some(v) = opt_str(p, "city")? {
        l.location.city = v;
    }
    if let Some(v) = opt_str(p, "state")? {
        l.location.state = v;
    }

    let lat = opt_f64(p, "latitude")?;
    let lon = opt_f64(p, "longitude")?;
    if lat.is_some() || lon.is_some() {
        let coords = &l.location.coordinates;
        l.location.coordinates = GeoPoint::new(
            lon.unwrap_or(coords.longitude()),
            lat.unwrap_or(coords.latitude()),
        )?;
    }

    if let Some(price) = price(p, l.kind, false)? {
        l.price = price;
    }
    if let Some(list) = opt_string_list(p, "amenities")? {
        l.amenities = normalize_amenities(list);
    }
    if let Some(d) = availability_date(p)? {
        l.availability_date = d;
    }

    match &mut l.details {
        ListingDetails::Room(room) => {
            if p.contains_key("bhk") {
                room.bhk = opt_str(p, "bhk")?.unwrap_or_default();
            }
        }
        ListingDetails::Hostel(h) => {
            if let Some(t) = hostel_type(p)? {
                h.hostel_type = t;
            }
            if let Some(n) = beds(p, "totalBeds")? {
                h.total_beds = n;
            }
            if let Some(n) = beds(p, "availableBeds")? {
                h.available_beds = n;
            }
            merge_facilities(&mut h.facilities, p)?;
            if let Some(v) = opt_bool(p, "showReviews")? {
                h.show_reviews = v;
            }
            if let Some(r) = admin_rating(p)? {
                h.admin_rating = Some(r);
            }
            check_beds(h)?;
        }
    }
    Ok(())
}
