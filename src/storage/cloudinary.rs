// src/storage/cloudinary.rs

use base64::Engine;
use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{info, warn};

use super::{ObjectStore, StoredObject, UploadFile};
use crate::errors::ServerError;

/// Signed uploads against the Cloudinary REST API.
pub struct CloudinaryStore {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    client: Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ServerError::Storage(e.to_string()))?;

        Ok(Self {
            cloud_name,
            api_key,
            api_secret,
            client,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{action}",
            self.cloud_name
        )
    }

    /// `sha256("k1=v1&k2=v2" + secret)` over the params sorted by key.
    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.api_secret)
    }

    fn post_signed<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        signed: Vec<(&str, String)>,
        extra: Vec<(&str, String)>,
    ) -> Result<T, ServerError> {
        let signature = self.sign(&signed);

        let mut form = signed;
        form.extend(extra);
        form.push(("api_key", self.api_key.clone()));
        form.push(("signature", signature));
        form.push(("signature_algorithm", "sha256".to_string()));

        let resp = self
            .client
            .post(self.endpoint(action))
            .form(&form)
            .send()
            .map_err(|e| ServerError::Storage(format!("Cloudinary request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(ServerError::Storage(format!(
                "Cloudinary API error: {status} - {text}"
            )));
        }

        resp.json::<T>()
            .map_err(|e| ServerError::Storage(format!("Cloudinary response unreadable: {e}")))
    }
}

pub fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    Sha256::digest(format!("{joined}{secret}").as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl ObjectStore for CloudinaryStore {
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredObject, ServerError> {
        let data_uri = format!(
            "data:{};base64,{}",
            file.content_type,
            base64::engine::general_purpose::STANDARD.encode(&file.bytes)
        );
        let timestamp = Utc::now().timestamp().to_string();

        let uploaded: UploadResponse = self.post_signed(
            "upload",
            vec![("folder", folder.to_string()), ("timestamp", timestamp)],
            vec![("file", data_uri)],
        )?;

        info!("Uploaded {} to Cloudinary as {}", file.filename, uploaded.public_id);
        Ok(StoredObject {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    fn delete(&self, public_id: &str) -> Result<(), ServerError> {
        let timestamp = Utc::now().timestamp().to_string();

        let destroyed: DestroyResponse = self.post_signed(
            "destroy",
            vec![("public_id", public_id.to_string()), ("timestamp", timestamp)],
            Vec::new(),
        )?;

        match destroyed.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!("Cloudinary had no object {public_id}");
                Ok(())
            }
            other => Err(ServerError::Storage(format!(
                "Cloudinary destroy of {public_id} returned {other}"
            ))),
        }
    }
}
