// src/storage/mod.rs
//
// Image storage behind a small trait so listings never talk to a vendor directly.

pub mod cloudinary;
pub mod disk;

use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::ServerError;
use crate::payload::Payload;

pub use cloudinary::CloudinaryStore;
pub use disk::DiskStore;

/// Upper bound on files accepted in one request.
pub const MAX_FILES_PER_REQUEST: usize = 5;

/// A file as it arrives inside a JSON body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Base64, optionally as a `data:<type>;base64,` URI.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn decode(p: UploadPayload) -> Result<Self, ServerError> {
        let (uri_type, encoded) = match p.data.strip_prefix("data:") {
            Some(rest) => match rest.split_once(";base64,") {
                Some((t, d)) => (Some(t.to_string()), d),
                None => return Err(ServerError::validation("Invalid image file.")),
            },
            None => (None, p.data.as_str()),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| ServerError::validation("Invalid image file."))?;
        if bytes.is_empty() {
            return Err(ServerError::validation("Invalid image file."));
        }

        let content_type = p
            .content_type
            .or(uri_type)
            .unwrap_or_else(|| {
                crate::responses::files::content_type_for(&p.filename).to_string()
            });

        Ok(Self {
            filename: p.filename,
            content_type,
            bytes,
        })
    }

    /// Lowercase alphanumeric extension, if the filename has a usable one.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        (!ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then_some(ext)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
}

pub trait ObjectStore: Send + Sync {
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredObject, ServerError>;

    fn delete(&self, public_id: &str) -> Result<(), ServerError>;

    /// Bytes for a path under `/upload/`, when this store serves its own files.
    fn local_file(&self, _rel_path: &str) -> Result<Option<Vec<u8>>, ServerError> {
        Ok(None)
    }
}

/// Read the files under `key` (array of `{filename, contentType, data}`).
pub fn files_from(p: &Payload, key: &str) -> Result<Vec<UploadFile>, ServerError> {
    let items = match p.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ServerError::validation(format!("{key} must be a list of files."))),
    };
    if items.len() > MAX_FILES_PER_REQUEST {
        return Err(ServerError::validation(format!(
            "At most {MAX_FILES_PER_REQUEST} files per request."
        )));
    }

    items
        .iter()
        .map(|v| {
            let p: UploadPayload = serde_json::from_value(v.clone())
                .map_err(|_| ServerError::validation("Invalid image file."))?;
            UploadFile::decode(p)
        })
        .collect()
}

/// Upload every file. If one fails, the ones already stored are removed again.
pub fn upload_all(
    store: &dyn ObjectStore,
    files: &[UploadFile],
    folder: &str,
) -> Result<Vec<String>, ServerError> {
    let mut stored: Vec<StoredObject> = Vec::with_capacity(files.len());
    for file in files {
        match store.upload(file, folder) {
            Ok(obj) => stored.push(obj),
            Err(e) => {
                for obj in &stored {
                    if let Err(del) = store.delete(&obj.public_id) {
                        warn!("Failed to clean up {} after upload error: {del}", obj.public_id);
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(stored.into_iter().map(|o| o.url).collect())
}

/// Public id for a stored URL: the path after `/upload/`, without a leading
/// `v<digits>` version segment and without the file extension.
///
/// `https://res.cloudinary.com/demo/image/upload/v1712/rooms/abc.jpg` -> `rooms/abc`
pub fn public_id_from_url(raw: &str) -> Result<String, ServerError> {
    let invalid = || ServerError::validation("Invalid image URL.");

    let url = url::Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let mut rest: &[&str] = match segments.iter().position(|s| *s == "upload") {
        Some(i) => &segments[i + 1..],
        None => &segments,
    };
    if let Some(first) = rest.first() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version && rest.len() > 1 {
            rest = &rest[1..];
        }
    }

    let (last, dirs) = rest.split_last().ok_or_else(invalid)?;
    let stem = match last.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => last,
    };

    let mut parts: Vec<&str> = dirs.to_vec();
    parts.push(stem);
    Ok(parts.join("/"))
}
