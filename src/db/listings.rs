// src/db/listings.rs
//
// Rooms and hostels share one table; `kind` tells them apart and `details`
// holds the variant fields.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::domain::listing::{
    GeoPoint, Listing, ListingDetails, ListingKind, ListingStatus, Location, Price,
};
use crate::errors::ServerError;

const COLUMNS: &str = "id, kind, title, description, address, city, state, longitude, latitude, \
     price, amenities, images, availability_status, owner_id, views_count, availability_date, \
     bookmarks, feedbacks, history, details, created_at, updated_at";

/// A listing row before its JSON columns are decoded.
struct ListingRow {
    id: i64,
    kind: String,
    title: String,
    description: String,
    address: String,
    city: String,
    state: String,
    longitude: f64,
    latitude: f64,
    price: i64,
    amenities: String,
    images: String,
    availability_status: String,
    owner_id: i64,
    views_count: i64,
    availability_date: DateTime<Utc>,
    bookmarks: String,
    feedbacks: String,
    history: String,
    details: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn read_row(r: &Row<'_>) -> rusqlite::Result<ListingRow> {
    Ok(ListingRow {
        id: r.get(0)?,
        kind: r.get(1)?,
        title: r.get(2)?,
        description: r.get(3)?,
        address: r.get(4)?,
        city: r.get(5)?,
        state: r.get(6)?,
        longitude: r.get(7)?,
        latitude: r.get(8)?,
        price: r.get(9)?,
        amenities: r.get(10)?,
        images: r.get(11)?,
        availability_status: r.get(12)?,
        owner_id: r.get(13)?,
        views_count: r.get(14)?,
        availability_date: r.get(15)?,
        bookmarks: r.get(16)?,
        feedbacks: r.get(17)?,
        history: r.get(18)?,
        details: r.get(19)?,
        created_at: r.get(20)?,
        updated_at: r.get(21)?,
    })
}

impl ListingRow {
    fn into_listing(self) -> Result<Listing, ServerError> {
        let kind = ListingKind::parse(&self.kind)
            .ok_or_else(|| ServerError::DbError(format!("unknown listing kind {}", self.kind)))?;
        let availability_status = ListingStatus::parse(&self.availability_status).ok_or_else(|| {
            ServerError::DbError(format!("unknown status {}", self.availability_status))
        })?;

        Ok(Listing {
            id: self.id,
            kind,
            title: self.title,
            description: self.description,
            location: Location {
                address: self.address,
                city: self.city,
                state: self.state,
                coordinates: GeoPoint::new(self.longitude, self.latitude)?,
            },
            price: Price::for_kind(kind, self.price),
            amenities: serde_json::from_str(&self.amenities)?,
            images: serde_json::from_str(&self.images)?,
            availability_status,
            owner_id: self.owner_id,
            views_count: self.views_count,
            availability_date: self.availability_date,
            bookmarks: serde_json::from_str(&self.bookmarks)?,
            feedbacks: serde_json::from_str(&self.feedbacks)?,
            history: serde_json::from_str(&self.history)?,
            details: ListingDetails::from_json(kind, &self.details)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect(conn: &Connection, sql: &str, bind: &[SqlValue]) -> Result<Vec<Listing>, ServerError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(bind.iter()), read_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?.into_listing()?);
    }
    Ok(out)
}

/// Insert a new listing; `listing.id` is ignored. Returns the new id.
pub fn insert_listing(conn: &Connection, l: &Listing) -> Result<i64, ServerError> {
    conn.execute(
        "insert into listings (kind, title, description, address, city, state, longitude, latitude,
            price, amenities, images, availability_status, owner_id, views_count, availability_date,
            bookmarks, feedbacks, history, details, created_at, updated_at)
         values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            l.kind.as_str(),
            l.title,
            l.description,
            l.location.address,
            l.location.city,
            l.location.state,
            l.location.coordinates.longitude(),
            l.location.coordinates.latitude(),
            l.price.amount(),
            serde_json::to_string(&l.amenities)?,
            serde_json::to_string(&l.images)?,
            l.availability_status.as_str(),
            l.owner_id,
            l.views_count,
            l.availability_date,
            serde_json::to_string(&l.bookmarks)?,
            serde_json::to_string(&l.feedbacks)?,
            serde_json::to_string(&l.history)?,
            l.details.to_json()?,
            l.created_at,
            l.updated_at,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert listing failed: {e}")))?;

    Ok(conn.last_insert_rowid())
}

pub fn find_listing(
    conn: &Connection,
    kind: ListingKind,
    id: i64,
) -> Result<Option<Listing>, ServerError> {
    let row = conn
        .query_row(
            &format!("select {COLUMNS} from listings where kind = ? and id = ?"),
            params![kind.as_str(), id],
            read_row,
        )
        .optional()?;

    row.map(ListingRow::into_listing).transpose()
}

/// Write back every mutable column of a loaded listing. Status and views
/// have their own single-column writes.
pub fn save_listing(conn: &Connection, l: &Listing) -> Result<(), ServerError> {
    let changed = conn.execute(
        "update listings set
            title = ?, description = ?, address = ?, city = ?, state = ?,
            longitude = ?, latitude = ?, price = ?, amenities = ?, images = ?,
            availability_date = ?, bookmarks = ?, feedbacks = ?, history = ?, details = ?,
            updated_at = ?
         where kind = ? and id = ?",
        params![
            l.title,
            l.description,
            l.location.address,
            l.location.city,
            l.location.state,
            l.location.coordinates.longitude(),
            l.location.coordinates.latitude(),
            l.price.amount(),
            serde_json::to_string(&l.amenities)?,
            serde_json::to_string(&l.images)?,
            l.availability_date,
            serde_json::to_string(&l.bookmarks)?,
            serde_json::to_string(&l.feedbacks)?,
            serde_json::to_string(&l.history)?,
            l.details.to_json()?,
            l.updated_at,
            l.kind.as_str(),
            l.id,
        ],
    )?;

    if changed == 0 {
        return Err(l.kind.not_found());
    }
    Ok(())
}

pub fn update_status(
    conn: &Connection,
    kind: ListingKind,
    id: i64,
    status: ListingStatus,
    now: DateTime<Utc>,
) -> Result<usize, ServerError> {
    Ok(conn.execute(
        "update listings set availability_status = ?, updated_at = ? where kind = ? and id = ?",
        params![status.as_str(), now, kind.as_str(), id],
    )?)
}

/// Single-statement increment so concurrent readers never lose a view.
pub fn increment_views(conn: &Connection, kind: ListingKind, id: i64) -> Result<usize, ServerError> {
    Ok(conn.execute(
        "update listings set views_count = views_count + 1 where kind = ? and id = ?",
        params![kind.as_str(), id],
    )?)
}

pub fn delete_listing(conn: &Connection, kind: ListingKind, id: i64) -> Result<usize, ServerError> {
    Ok(conn.execute(
        "delete from listings where kind = ? and id = ?",
        params![kind.as_str(), id],
    )?)
}

/// Conjunctive SQL-side filters. Amenity and distance checks happen in Rust.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub owner_id: Option<i64>,
    /// Case-insensitive substring of address, city or state.
    pub location: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('%');
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Newest first.
pub fn query_listings(
    conn: &Connection,
    kind: ListingKind,
    filter: &ListingFilter,
) -> Result<Vec<Listing>, ServerError> {
    let mut clauses: Vec<&str> = vec!["kind = ?"];
    let mut bind: Vec<SqlValue> = vec![SqlValue::Text(kind.as_str().to_string())];

    if let Some(status) = filter.status {
        clauses.push("availability_status = ?");
        bind.push(SqlValue::Text(status.as_str().to_string()));
    }
    if let Some(owner_id) = filter.owner_id {
        clauses.push("owner_id = ?");
        bind.push(SqlValue::Integer(owner_id));
    }
    if let Some(loc) = &filter.location {
        clauses.push(
            "(lower(address) like ? escape '\\' or lower(city) like ? escape '\\' \
             or lower(state) like ? escape '\\')",
        );
        let pattern = escape_like(&loc.to_lowercase());
        bind.extend(std::iter::repeat(SqlValue::Text(pattern)).take(3));
    }
    if let Some(min) = filter.price_min {
        clauses.push("price >= ?");
        bind.push(SqlValue::Integer(min));
    }
    if let Some(max) = filter.price_max {
        clauses.push("price <= ?");
        bind.push(SqlValue::Integer(max));
    }
    if let Some(b) = filter.bounding_box {
        clauses.push("latitude between ? and ? and longitude between ? and ?");
        bind.extend([
            SqlValue::Real(b.min_lat),
            SqlValue::Real(b.max_lat),
            SqlValue::Real(b.min_lon),
            SqlValue::Real(b.max_lon),
        ]);
    }

    let sql = format!(
        "select {COLUMNS} from listings where {} order by created_at desc, id desc",
        clauses.join(" and ")
    );
    collect(conn, &sql, &bind)
}

pub fn bookmarked_by(
    conn: &Connection,
    kind: ListingKind,
    user_id: i64,
) -> Result<Vec<Listing>, ServerError> {
    let sql = format!(
        "select {COLUMNS} from listings
         where kind = ?
           and exists (select 1 from json_each(listings.bookmarks) b where b.value = ?)
         order by created_at desc, id desc"
    );
    collect(
        conn,
        &sql,
        &[SqlValue::Text(kind.as_str().to_string()), SqlValue::Integer(user_id)],
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub kind: ListingKind,
    pub status: ListingStatus,
    pub count: i64,
}

pub fn status_counts(conn: &Connection) -> Result<Vec<StatusCount>, ServerError> {
    let mut stmt = conn.prepare(
        "select kind, availability_status, count(*) from listings
         group by kind, availability_status
         order by kind, availability_status",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, i64>(2)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (kind, status, count) = r?;
        match (ListingKind::parse(&kind), ListingStatus::parse(&status)) {
            (Some(kind), Some(status)) => out.push(StatusCount { kind, status, count }),
            _ => return Err(ServerError::DbError(format!("bad listing row {kind}/{status}"))),
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingViews {
    pub id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub views_count: i64,
}

/// Most viewed first.
pub fn view_counts(conn: &Connection) -> Result<Vec<ListingViews>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, kind, title, views_count from listings order by views_count desc, id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, i64>(3)?,
        ))
    })?;

    let mut out = Vec::new();
    for r in rows {
        let (id, kind, title, views_count) = r?;
        let kind = ListingKind::parse(&kind)
            .ok_or_else(|| ServerError::DbError(format!("unknown listing kind {kind}")))?;
        out.push(ListingViews {
            id,
            kind,
            title,
            views_count,
        });
    }
    Ok(out)
}
