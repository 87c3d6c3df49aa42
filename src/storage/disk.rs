// src/storage/disk.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{ObjectStore, StoredObject, UploadFile};
use crate::auth::tokens::generate_token_default;
use crate::errors::ServerError;

/// Stores images under a local directory and serves them from `/upload/...`.
pub struct DiskStore {
    root: PathBuf,
    public_base_url: String,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Result<Self, ServerError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| ServerError::Storage(format!("create {}: {e}", root.display())))?;

        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a relative path, refusing anything that could leave `root`.
    fn resolve(&self, rel_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for seg in rel_path.split('/').filter(|s| !s.is_empty()) {
            let ok = seg != ".."
                && seg != "."
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if !ok {
                return None;
            }
            path.push(seg);
        }
        (path != self.root).then_some(path)
    }
}

fn find_by_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| p.file_stem().and_then(|s| s.to_str()) == Some(stem))
}

impl ObjectStore for DiskStore {
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredObject, ServerError> {
        let name = generate_token_default();
        let public_id = format!("{folder}/{name}");
        let filename = match file.extension() {
            Some(ext) => format!("{name}.{ext}"),
            None => name,
        };
        let rel = format!("{folder}/{filename}");

        let path = self
            .resolve(&rel)
            .ok_or_else(|| ServerError::Storage(format!("bad upload path {rel}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ServerError::Storage(e.to_string()))?;
        }
        fs::write(&path, &file.bytes).map_err(|e| ServerError::Storage(e.to_string()))?;

        info!("Stored {} at {}", file.filename, path.display());
        Ok(StoredObject {
            url: format!("{}/upload/{rel}", self.public_base_url),
            public_id,
        })
    }

    fn delete(&self, public_id: &str) -> Result<(), ServerError> {
        let Some(target) = self.resolve(public_id) else {
            return Err(ServerError::Storage(format!("bad public id {public_id}")));
        };
        let (Some(dir), Some(stem)) = (target.parent(), target.file_name().and_then(|s| s.to_str()))
        else {
            return Err(ServerError::Storage(format!("bad public id {public_id}")));
        };

        match find_by_stem(dir, stem) {
            Some(path) => fs::remove_file(&path).map_err(|e| ServerError::Storage(e.to_string())),
            None => {
                warn!("No stored file for {public_id}");
                Ok(())
            }
        }
    }

    fn local_file(&self, rel_path: &str) -> Result<Option<Vec<u8>>, ServerError> {
        let Some(path) = self.resolve(rel_path) else {
            return Ok(None);
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServerError::Storage(e.to_string())),
        }
    }
}
