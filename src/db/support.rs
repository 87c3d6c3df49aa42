// src/db/support.rs
//
// Issues, enquiries and referrals: append-only records read back by the panel.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::domain::support::{Enquiry, Issue, Referral, ReferralCoordinates, ReferralLocation};
use crate::errors::ServerError;

pub fn insert_issue(
    conn: &Connection,
    user_id: i64,
    room_id: i64,
    description: &str,
    now: DateTime<Utc>,
) -> Result<Issue, ServerError> {
    conn.execute(
        "insert into issues (user_id, listing_id, issue_description, created_at, updated_at)
         values (?, ?, ?, ?, ?)",
        params![user_id, room_id, description, now, now],
    )?;
    Ok(Issue {
        id: conn.last_insert_rowid(),
        user_id,
        room_id,
        issue_description: description.to_string(),
        created_at: now,
        updated_at: now,
    })
}

pub fn list_issues(conn: &Connection) -> Result<Vec<Issue>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, user_id, listing_id, issue_description, created_at, updated_at
         from issues order by created_at desc, id desc",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(Issue {
            id: r.get(0)?,
            user_id: r.get(1)?,
            room_id: r.get(2)?,
            issue_description: r.get(3)?,
            created_at: r.get(4)?,
            updated_at: r.get(5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_enquiry(conn: &Connection, e: &Enquiry) -> Result<i64, ServerError> {
    conn.execute(
        "insert into enquiries (name, mobile_no, email, subject, message, created_at)
         values (?, ?, ?, ?, ?, ?)",
        params![e.name, e.mobile_no, e.email, e.subject, e.message, e.created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_enquiries(conn: &Connection) -> Result<Vec<Enquiry>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, name, mobile_no, email, subject, message, created_at
         from enquiries order by created_at desc, id desc",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(Enquiry {
            id: r.get(0)?,
            name: r.get(1)?,
            mobile_no: r.get(2)?,
            email: r.get(3)?,
            subject: r.get(4)?,
            message: r.get(5)?,
            created_at: r.get(6)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_referral(conn: &Connection, r: &Referral) -> Result<i64, ServerError> {
    conn.execute(
        "insert into referrals (referrer_id, landlord_name, landlord_mobile_no, address, city, state,
            latitude, longitude, rent, amenities, images, created_at)
         values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            r.referrer,
            r.landlord_name,
            r.landlord_mobile_no,
            r.location.address,
            r.location.city,
            r.location.state,
            r.location.coordinates.lat,
            r.location.coordinates.lng,
            r.rent,
            serde_json::to_string(&r.amenities)?,
            serde_json::to_string(&r.images)?,
            r.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_referrals(conn: &Connection) -> Result<Vec<Referral>, ServerError> {
    let mut stmt = conn.prepare(
        "select id, referrer_id, landlord_name, landlord_mobile_no, address, city, state,
            latitude, longitude, rent, amenities, images, created_at
         from referrals order by created_at desc, id desc",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            Referral {
                id: r.get(0)?,
                referrer: r.get(1)?,
                landlord_name: r.get(2)?,
                landlord_mobile_no: r.get(3)?,
                location: ReferralLocation {
                    address: r.get(4)?,
                    city: r.get(5)?,
                    state: r.get(6)?,
                    coordinates: ReferralCoordinates {
                        lat: r.get(7)?,
                        lng: r.get(8)?,
                    },
                },
                rent: r.get(9)?,
                amenities: Vec::new(),
                images: Vec::new(),
                created_at: r.get(12)?,
            },
            r.get::<_, String>(10)?,
            r.get::<_, String>(11)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (mut referral, amenities, images) = row?;
        referral.amenities = serde_json::from_str(&amenities)?;
        referral.images = serde_json::from_str(&images)?;
        out.push(referral);
    }
    Ok(out)
}
