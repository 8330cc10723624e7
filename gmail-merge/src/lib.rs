//! gmail-merge: mail-merge sending through the Gmail API
//!
//! Sends HTML email either from a template supplied by the caller or from an
//! existing Gmail draft located by subject, substituting `{{field}}`
//! placeholders and optionally overriding the From header with an alias.
//!
//! # Example
//!
//! ```no_run
//! use gmail_merge::gmail::GmailProvider;
//! use gmail_merge::{Alias, Mailer, MergeFields, Recipients, Template};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GMAIL_CLIENT_EMAIL, GMAIL_PRIVATE_KEY, ...
//!     let mailer = Mailer::new(GmailProvider::from_env()?);
//!
//!     let template = Template::new("Welcome {{name}}", "<p>Hi {{name}}!</p>");
//!     let fields = MergeFields::new().with("name", "Ana");
//!     let alias = Alias::new("Events Team", "events@example.com");
//!
//!     let outcome = mailer
//!         .send_email(&template, &Recipients::to("ana@example.com"), Some(&alias), &fields)
//!         .await;
//!     println!("{}", serde_json::to_string(&outcome)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Service-account configuration from the environment
//! - [`error`]: Error types and handling
//! - [`templates`]: Merge field validation and substitution
//! - [`mime`]: Raw message construction and encoding
//! - [`gmail`]: Gmail API and OAuth collaborators
//! - [`drafts`]: Draft lookup and template extraction
//! - [`mailer`]: Public send operations

pub mod config;
pub mod drafts;
pub mod error;
pub mod gmail;
pub mod mailer;
pub mod mime;
pub mod templates;

// Re-export commonly used types
pub use config::GmailConfig;
pub use error::{MailError, Result};
pub use mailer::{Mailer, SendOutcome};
pub use mime::{Alias, EncodedMessage, Recipients};
pub use templates::{MergeFields, Template};
