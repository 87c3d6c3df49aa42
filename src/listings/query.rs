// src/listings/query.rs
//
// Read paths: filtered lists, proximity search, detail view, analytics.

use serde::Serialize;

use crate::db::connection::Database;
use crate::db::interests::distinct_active_users;
use crate::db::listings::{
    self as db_listings, status_counts, view_counts, BoundingBox, ListingFilter, ListingViews,
    StatusCount,
};
use crate::db::owners::{owner_summary, OwnerSummary};
use crate::domain::listing::{Listing, ListingKind, ListingStatus};
use crate::errors::ServerError;

pub const DEFAULT_MAX_DISTANCE_M: f64 = 5000.0;
const EARTH_RADIUS_M: f64 = 6_371_008.8;
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Public listing filters, as they arrive in the query string.
#[derive(Debug, Clone, Default)]
pub struct AvailableFilters<'a> {
    pub location: Option<&'a str>,
    /// `min-max`, inclusive.
    pub rent_range: Option<&'a str>,
    /// Comma-separated; a listing must have all of them.
    pub amenities: Option<&'a str>,
}

pub fn parse_rent_range(raw: &str) -> Result<(i64, i64), ServerError> {
    let bad = || ServerError::validation("rentRange must look like min-max, e.g. 1000-2000.");

    let (min, max) = raw.split_once('-').ok_or_else(bad)?;
    let min: i64 = min.trim().parse().map_err(|_| bad())?;
    let max: i64 = max.trim().parse().map_err(|_| bad())?;
    if min > max {
        return Err(bad());
    }
    Ok((min, max))
}

fn parse_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Great-circle distance in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lon2 - lon1).to_radians();

    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// A box that contains every point within `radius_m` of the center. Longitude
/// is left unbounded near the poles and across the antimeridian.
pub fn bounding_box(lat: f64, lon: f64, radius_m: f64) -> BoundingBox {
    let dlat = radius_m / METERS_PER_DEGREE_LAT;
    let cos_lat = lat.to_radians().cos();

    let (min_lon, max_lon) = if cos_lat < 1e-6 {
        (-180.0, 180.0)
    } else {
        let dlon = radius_m / (METERS_PER_DEGREE_LAT * cos_lat);
        if lon - dlon < -180.0 || lon + dlon > 180.0 {
            (-180.0, 180.0)
        } else {
            (lon - dlon, lon + dlon)
        }
    };

    BoundingBox {
        min_lat: (lat - dlat).max(-90.0),
        max_lat: (lat + dlat).min(90.0),
        min_lon,
        max_lon,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub owner: Option<OwnerSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_rooms: i64,
    pub total_hostels: i64,
    pub by_status: Vec<StatusCount>,
    pub views: Vec<ListingViews>,
    pub active_users: i64,
}

pub struct QueryService<'a> {
    db: &'a Database,
}

impl<'a> QueryService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list_available(
        &self,
        kind: ListingKind,
        filters: &AvailableFilters<'_>,
    ) -> Result<Vec<Listing>, ServerError> {
        let (price_min, price_max) = match filters.rent_range {
            Some(raw) => {
                let (min, max) = parse_rent_range(raw)?;
                (Some(min), Some(max))
            }
            None => (None, None),
        };

        let filter = ListingFilter {
            status: Some(ListingStatus::Available),
            location: filters.location.map(str::to_string),
            price_min,
            price_max,
            ..ListingFilter::default()
        };
        let mut listings = self
            .db
            .with_conn(|conn| db_listings::query_listings(conn, kind, &filter))?;

        if let Some(raw) = filters.amenities {
            let wanted = parse_amenities(raw);
            listings.retain(|l| wanted.iter().all(|w| l.amenities.contains(w)));
        }
        Ok(listings)
    }

    /// Nearest first.
    pub fn find_near(
        &self,
        kind: ListingKind,
        lat: f64,
        lon: f64,
        max_distance_m: Option<f64>,
        status: Option<ListingStatus>,
    ) -> Result<Vec<NearbyListing>, ServerError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ServerError::validation("Coordinates are out of range."));
        }
        let radius = max_distance_m.unwrap_or(DEFAULT_MAX_DISTANCE_M);
        if !radius.is_finite() || radius < 0.0 {
            return Err(ServerError::validation("maxDistance must be a positive number."));
        }

        let filter = ListingFilter {
            status: Some(status.unwrap_or(ListingStatus::Available)),
            bounding_box: Some(bounding_box(lat, lon, radius)),
            ..ListingFilter::default()
        };
        let candidates = self
            .db
            .with_conn(|conn| db_listings::query_listings(conn, kind, &filter))?;

        let mut near: Vec<NearbyListing> = candidates
            .into_iter()
            .filter_map(|listing| {
                let c = &listing.location.coordinates;
                let distance_m = haversine_m(lat, lon, c.latitude(), c.longitude());
                (distance_m <= radius).then_some(NearbyListing { listing, distance_m })
            })
            .collect();

        near.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        Ok(near)
    }

    /// Counts the view, then reads the listing.
    pub fn get_by_id(&self, kind: ListingKind, id: i64) -> Result<ListingDetail, ServerError> {
        self.db.with_conn(|conn| {
            if db_listings::increment_views(conn, kind, id)? == 0 {
                return Err(kind.not_found());
            }
            let listing = db_listings::find_listing(conn, kind, id)?.ok_or_else(|| kind.not_found())?;
            let owner = owner_summary(conn, kind, listing.owner_id)?;
            Ok(ListingDetail { listing, owner })
        })
    }

    pub fn list_all(&self, kind: ListingKind) -> Result<Vec<Listing>, ServerError> {
        self.db
            .with_conn(|conn| db_listings::query_listings(conn, kind, &ListingFilter::default()))
    }

    /// Newest first.
    pub fn list_by_owner(&self, kind: ListingKind, owner_id: i64) -> Result<Vec<Listing>, ServerError> {
        let filter = ListingFilter {
            owner_id: Some(owner_id),
            ..ListingFilter::default()
        };
        self.db
            .with_conn(|conn| db_listings::query_listings(conn, kind, &filter))
    }

    pub fn analytics(&self) -> Result<Analytics, ServerError> {
        self.db.with_conn(|conn| {
            let by_status = status_counts(conn)?;
            let total = |kind: ListingKind| {
                by_status
                    .iter()
                    .filter(|c| c.kind == kind)
                    .map(|c| c.count)
                    .sum::<i64>()
            };

            Ok(Analytics {
                total_rooms: total(ListingKind::Room),
                total_hostels: total(ListingKind::Hostel),
                views: view_counts(conn)?,
                active_users: distinct_active_users(conn)?,
                by_status,
            })
        })
    }
}
