//! Gmail API collaborator
//!
//! [`MailProvider`] performs the credential exchange and hands out a
//! [`MailService`] session for one operation. The concrete implementations
//! talk to Google's OAuth token endpoint and the Gmail REST API.

use crate::error::Result;
use crate::mime::EncodedMessage;

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{AccessToken, ServiceAccountAuth};
pub use client::{GmailClient, GmailProvider};
pub use types::{Draft, DraftRef, Header, Message, MessagePart, MessagePartBody};

/// Authenticated mailbox operations
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MailService: Send + Sync {
    /// Search drafts with a Gmail query (e.g. `subject:Welcome`)
    async fn list_drafts(&self, query: &str) -> Result<Vec<DraftRef>>;

    /// Fetch a draft with its full payload
    async fn get_draft(&self, id: &str) -> Result<Draft>;

    /// Send a raw message; returns the HTTP status of the response
    async fn send_raw(&self, message: &EncodedMessage) -> Result<u16>;
}

/// Source of authenticated sessions
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MailProvider: Send + Sync {
    /// Run the credential exchange and return a fresh session
    async fn authenticate(&self) -> Result<Box<dyn MailService>>;
}
