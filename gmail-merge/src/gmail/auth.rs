//! Service-account authentication (OAuth 2.0 JWT bearer grant)

use crate::config::GmailConfig;
use crate::error::{MailError, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of a signed assertion, the maximum Google accepts
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// JWT claims of the signed assertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (service-account email)
    pub iss: String,
    /// Space-separated OAuth scopes
    pub scope: String,
    /// Audience (token endpoint)
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Impersonated mailbox user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Exchanges a signed service-account assertion for an access token
pub struct ServiceAccountAuth {
    client_email: String,
    scopes: String,
    token_url: String,
    delegated_user: Option<String>,
    key: EncodingKey,
    http: reqwest::Client,
}

impl ServiceAccountAuth {
    /// Create an authenticator from configuration
    ///
    /// Fails with [`MailError::Config`] when the private key is not an RSA PEM key.
    pub fn new(config: &GmailConfig, http: reqwest::Client) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes()).map_err(|e| {
            MailError::Config(format!("Failed to parse service account key: {}", e))
        })?;

        Ok(Self {
            client_email: config.client_email.clone(),
            scopes: config.scopes.clone(),
            token_url: config.token_url.clone(),
            delegated_user: config.delegated_user.clone(),
            key,
            http,
        })
    }

    /// Claims for an assertion issued at `now`
    pub fn claims(&self, now: i64) -> Claims {
        Claims {
            iss: self.client_email.clone(),
            scope: self.scopes.clone(),
            aud: self.token_url.clone(),
            exp: now + ASSERTION_LIFETIME_SECS,
            iat: now,
            sub: self.delegated_user.clone(),
        }
    }

    /// Sign a fresh RS256 assertion
    pub fn create_assertion(&self) -> Result<String> {
        let claims = self.claims(Utc::now().timestamp());
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.key)?)
    }

    /// Perform the token exchange
    pub async fn authorize(&self) -> Result<AccessToken> {
        let assertion = self.create_assertion()?;

        debug!("Requesting access token from {} for {}", self.token_url, self.client_email);

        let response = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token request failed with status {}: {}", status, body);
            return Err(MailError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: AccessToken = response.json().await?;
        if token.access_token.is_empty() {
            return Err(MailError::Authentication(
                "token endpoint returned an empty access token".to_string(),
            ));
        }

        info!(
            "Authenticated as {} (token expires in {}s)",
            self.delegated_user.as_deref().unwrap_or(&self.client_email),
            token.expires_in
        );

        Ok(token)
    }
}
