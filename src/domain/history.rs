// src/domain/history.rs

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::listing::{HistoryEntry, Listing};
use crate::errors::ServerError;

/// Maximum number of snapshots retained per listing.
pub const HISTORY_LIMIT: usize = 3;

/// Which fields a snapshot copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    /// Every editable content field.
    Content,
    /// Only the image list.
    Images,
}

/// Prepend a snapshot of `data` and keep the newest `HISTORY_LIMIT` entries.
/// Identical consecutive snapshots are kept; older entries simply age out.
pub fn record_snapshot(history: &mut Vec<HistoryEntry>, data: Map<String, Value>, at: DateTime<Utc>) {
    history.insert(0, HistoryEntry { updated_at: at, data });
    history.truncate(HISTORY_LIMIT);
}

impl Listing {
    /// Capture the current state of `scope` into history. Must run before the
    /// mutation it guards, in the same transaction as the save.
    pub fn snapshot(&mut self, scope: SnapshotScope, at: DateTime<Utc>) -> Result<(), ServerError> {
        let data = match scope {
            SnapshotScope::Content => self.content_fields()?,
            SnapshotScope::Images => self.image_fields(),
        };
        record_snapshot(&mut self.history, data, at);
        Ok(())
    }
}
