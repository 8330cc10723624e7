//! Gmail REST API client

use super::auth::ServiceAccountAuth;
use super::types::{Draft, DraftList, DraftRef, SendRequest};
use super::{MailProvider, MailService};
use crate::config::GmailConfig;
use crate::error::{MailError, Result};
use crate::mime::EncodedMessage;
use tracing::{debug, warn};

/// Session bound to one access token
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/gmail/v1/users/{}/{}", self.base_url, self.user_id, path)
    }

    /// Map a non-success response to a provider error
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            warn!("Gmail API request failed with status {}: {}", status, message);
            Err(MailError::Provider {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait::async_trait]
impl MailService for GmailClient {
    async fn list_drafts(&self, query: &str) -> Result<Vec<DraftRef>> {
        debug!("Listing drafts matching {:?}", query);

        let response = self
            .http
            .get(self.url("drafts"))
            .bearer_auth(&self.access_token)
            .query(&[("q", query)])
            .send()
            .await?;

        let list: DraftList = Self::check_status(response).await?.json().await?;
        Ok(list.drafts)
    }

    async fn get_draft(&self, id: &str) -> Result<Draft> {
        debug!("Fetching draft {}", id);

        let response = self
            .http
            .get(self.url(&format!("drafts/{}", id)))
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()
            .await?;

        Ok(Self::check_status(response).await?.json().await?)
    }

    async fn send_raw(&self, message: &EncodedMessage) -> Result<u16> {
        let response = self
            .http
            .post(self.url("messages/send"))
            .bearer_auth(&self.access_token)
            .json(&SendRequest {
                raw: message.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Send rejected with status {}: {}", status, body);
        }

        Ok(status.as_u16())
    }
}

/// Authenticates a service account and opens Gmail sessions
pub struct GmailProvider {
    auth: ServiceAccountAuth,
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl GmailProvider {
    pub fn new(config: &GmailConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let auth = ServiceAccountAuth::new(config, http.clone())?;

        Ok(Self {
            auth,
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
        })
    }

    /// Load configuration from the environment and build a provider
    pub fn from_env() -> Result<Self> {
        Self::new(&GmailConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl MailProvider for GmailProvider {
    async fn authenticate(&self) -> Result<Box<dyn MailService>> {
        let token = self.auth.authorize().await?;

        Ok(Box::new(GmailClient::new(
            self.http.clone(),
            self.base_url.clone(),
            self.user_id.clone(),
            token.access_token,
        )))
    }
}
