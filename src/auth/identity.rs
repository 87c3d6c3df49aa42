// src/auth/identity.rs
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::errors::ServerError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Profile asserted by a federated identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedProfile {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, id_token: &str) -> Result<FederatedProfile, ServerError>;
}

/// Checks Google ID tokens against the tokeninfo endpoint.
pub struct GoogleVerifier {
    client_id: Option<String>,
    client: Client,
}

#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleVerifier {
    pub fn new(client_id: Option<String>) -> Result<Self, ServerError> {
        if client_id.is_none() {
            warn!("GOOGLE_CLIENT_ID not set; Google tokens will not be audience-checked");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServerError::Storage(e.to_string()))?;
        Ok(Self { client_id, client })
    }
}

impl IdentityVerifier for GoogleVerifier {
    fn verify(&self, id_token: &str) -> Result<FederatedProfile, ServerError> {
        let invalid = || ServerError::Unauthorized("Invalid Google token.".into());

        let resp = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .map_err(|e| {
                warn!("Google tokeninfo request failed: {e}");
                ServerError::InternalError
            })?;
        if !resp.status().is_success() {
            return Err(invalid());
        }

        let info: TokenInfo = resp.json().map_err(|_| invalid())?;

        if let Some(expected) = &self.client_id {
            if &info.aud != expected {
                warn!("Google token issued for another client: {}", info.aud);
                return Err(invalid());
            }
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(ServerError::Unauthorized("Google email is not verified.".into()));
        }
        let email = info.email.ok_or_else(invalid)?;

        Ok(FederatedProfile {
            subject: info.sub,
            name: info.name.unwrap_or_else(|| email.clone()),
            email,
            picture: info.picture,
        })
    }
}
