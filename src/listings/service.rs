// src/listings/service.rs
//
// Create, edit and remove listings. Every content edit snapshots the prior
// state and saves in one transaction; status changes are a single write.

use chrono::Utc;
use tracing::{info, warn};

use crate::app::App;
use crate::auth::gate::Principal;
use crate::db::connection::{write_tx, Database};
use crate::db::listings as db_listings;
use crate::domain::history::SnapshotScope;
use crate::domain::listing::{Feedback, Listing, ListingKind, ListingStatus};
use crate::domain::status::{next_status, StatusAction};
use crate::errors::ServerError;
use crate::listings::payload::{apply_patch, draft_from};
use crate::payload::{req_str, Payload};
use crate::storage::{files_from, public_id_from_url, upload_all, ObjectStore, UploadFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    Add,
    Delete,
}

impl ImageAction {
    pub fn parse(s: &str) -> Result<Self, ServerError> {
        match s {
            "add" => Ok(ImageAction::Add),
            "delete" => Ok(ImageAction::Delete),
            other => Err(ServerError::validation(format!(
                "Unknown image action '{other}'. Use 'add' or 'delete'."
            ))),
        }
    }
}

/// Object-store folder for a kind's images.
pub fn folder(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Room => "rooms",
        ListingKind::Hostel => "hostels",
    }
}

pub struct ListingService<'a> {
    db: &'a Database,
    store: &'a dyn ObjectStore,
}

impl<'a> ListingService<'a> {
    pub fn new(app: &'a App) -> Self {
        Self {
            db: &app.db,
            store: app.store.as_ref(),
        }
    }

    fn load(&self, kind: ListingKind, id: i64) -> Result<Listing, ServerError> {
        self.db
            .with_conn(|conn| db_listings::find_listing(conn, kind, id))?
            .ok_or_else(|| kind.not_found())
    }

    /// Load, mutate and save inside one transaction.
    fn edit<F>(&self, kind: ListingKind, id: i64, f: F) -> Result<Listing, ServerError>
    where
        F: FnOnce(&mut Listing) -> Result<(), ServerError>,
    {
        self.db.with_conn(|conn| {
            let tx = write_tx(conn)?;
            let mut listing =
                db_listings::find_listing(&tx, kind, id)?.ok_or_else(|| kind.not_found())?;

            f(&mut listing)?;
            listing.updated_at = Utc::now();
            db_listings::save_listing(&tx, &listing)?;

            tx.commit()?;
            Ok(listing)
        })
    }

    /// Panel members publish directly; everyone else goes through review.
    pub fn create(
        &self,
        kind: ListingKind,
        payload: &Payload,
        uploads: &[UploadFile],
        actor: &Principal,
    ) -> Result<Listing, ServerError> {
        let now = Utc::now();
        let draft = draft_from(kind, payload, now)?;

        if !actor.is_panel() && uploads.is_empty() {
            return Err(ServerError::validation(
                "No images provided. Please upload at least one image.",
            ));
        }

        let images = upload_all(self.store, uploads, folder(kind))?;
        let availability_status = if actor.is_panel() {
            ListingStatus::Available
        } else {
            ListingStatus::Pending
        };

        let mut listing = Listing {
            id: 0,
            kind,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            price: draft.price,
            amenities: draft.amenities,
            images,
            availability_status,
            owner_id: actor.id,
            views_count: 0,
            availability_date: draft.availability_date,
            bookmarks: Vec::new(),
            feedbacks: Vec::new(),
            history: Vec::new(),
            details: draft.details,
            created_at: now,
            updated_at: now,
        };

        listing.id = self
            .db
            .with_conn(|conn| db_listings::insert_listing(conn, &listing))?;

        info!(
            "{} {} created by {} {} as {}",
            kind.label(),
            listing.id,
            actor.role,
            actor.id,
            listing.availability_status
        );
        Ok(listing)
    }

    pub fn update(&self, kind: ListingKind, id: i64, patch: &Payload) -> Result<Listing, ServerError> {
        let listing = self.edit(kind, id, |l| {
            l.snapshot(SnapshotScope::Content, Utc::now())?;
            apply_patch(l, patch)
        })?;

        info!("{} {id} updated ({} history entries)", kind.label(), listing.history.len());
        Ok(listing)
    }

    pub fn update_images(
        &self,
        kind: ListingKind,
        id: i64,
        action: ImageAction,
        payload: &Payload,
    ) -> Result<Listing, ServerError> {
        match action {
            ImageAction::Add => {
                let files = files_from(payload, "images")?;
                if files.is_empty() {
                    return Err(ServerError::validation("No images provided."));
                }
                // Fail before uploading anything if the listing is gone.
                self.load(kind, id)?;

                let urls = upload_all(self.store, &files, folder(kind))?;
                let added = urls.len();
                let listing = self.edit(kind, id, move |l| {
                    l.snapshot(SnapshotScope::Images, Utc::now())?;
                    l.images.extend(urls);
                    Ok(())
                })?;

                info!("Added {added} image(s) to {} {id}", kind.label());
                Ok(listing)
            }
            ImageAction::Delete => {
                let url = req_str(payload, "imageUrl")?;
                let public_id = public_id_from_url(&url)?;

                let current = self.load(kind, id)?;
                if !current.images.iter().any(|i| *i == url) {
                    return Err(ServerError::not_found("Image not found on this listing."));
                }

                self.store.delete(&public_id)?;

                let listing = self.edit(kind, id, |l| {
                    l.snapshot(SnapshotScope::Images, Utc::now())?;
                    l.images.retain(|i| *i != url);
                    Ok(())
                })?;

                info!("Removed image {public_id} from {} {id}", kind.label());
                Ok(listing)
            }
        }
    }

    /// Deletes every stored image (best effort), then the listing. Interests
    /// and issues referencing it go with it.
    pub fn delete(&self, kind: ListingKind, id: i64) -> Result<(), ServerError> {
        let listing = self.load(kind, id)?;

        let mut failed = 0;
        for url in &listing.images {
            let outcome = public_id_from_url(url).and_then(|pid| self.store.delete(&pid));
            if let Err(e) = outcome {
                failed += 1;
                warn!("Could not delete image {url} of {} {id}: {e}", kind.label());
            }
        }

        let removed = self
            .db
            .with_conn(|conn| db_listings::delete_listing(conn, kind, id))?;
        if removed == 0 {
            return Err(kind.not_found());
        }

        info!(
            "{} {id} deleted ({} image(s), {failed} failed)",
            kind.label(),
            listing.images.len()
        );
        Ok(())
    }

    pub fn set_status(&self, kind: ListingKind, id: i64, action: StatusAction) -> Result<Listing, ServerError> {
        let listing = self.db.with_conn(|conn| {
            let tx = write_tx(conn)?;
            let mut listing =
                db_listings::find_listing(&tx, kind, id)?.ok_or_else(|| kind.not_found())?;

            let next = next_status(kind, listing.availability_status, action)?;
            let now = Utc::now();
            db_listings::update_status(&tx, kind, id, next, now)?;
            tx.commit()?;

            listing.availability_status = next;
            listing.updated_at = now;
            Ok(listing)
        })?;

        info!("{} {id} {}", kind.label(), action.done());
        Ok(listing)
    }

    pub fn add_feedback(
        &self,
        kind: ListingKind,
        id: i64,
        user_id: i64,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Listing, ServerError> {
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or_else(|| ServerError::validation("rating must be between 1 and 5."))?;

        self.edit(kind, id, |l| {
            l.feedbacks.push(Feedback {
                user_id,
                rating,
                comment: comment.unwrap_or_default(),
                created_at: Utc::now(),
            });
            Ok(())
        })
    }

    /// Returns false when the user had already bookmarked the listing.
    pub fn add_bookmark(&self, kind: ListingKind, id: i64, user_id: i64) -> Result<bool, ServerError> {
        let mut added = false;
        self.edit(kind, id, |l| {
            if !l.bookmarks.contains(&user_id) {
                l.bookmarks.push(user_id);
                added = true;
            }
            Ok(())
        })?;
        Ok(added)
    }

    /// Returns false when there was no bookmark to remove.
    pub fn remove_bookmark(&self, kind: ListingKind, id: i64, user_id: i64) -> Result<bool, ServerError> {
        let mut removed = false;
        self.edit(kind, id, |l| {
            let before = l.bookmarks.len();
            l.bookmarks.retain(|u| *u != user_id);
            removed = l.bookmarks.len() != before;
            Ok(())
        })?;
        Ok(removed)
    }

    pub fn bookmarks_for(&self, kind: ListingKind, user_id: i64) -> Result<Vec<Listing>, ServerError> {
        self.db
            .with_conn(|conn| db_listings::bookmarked_by(conn, kind, user_id))
    }
}
