//! Public send operations
//!
//! Both operations authenticate through the injected [`MailProvider`] on
//! every call. The `try_*` variants return typed errors; `send_email` and
//! `send_email_from_draft` flatten any error into its message text.

use crate::drafts;
use crate::error::{MailError, Result};
use crate::gmail::{MailProvider, MailService};
use crate::mime::{Alias, EncodedMessage, MessageEncoder, Recipients};
use crate::templates::{MergeFields, Template};
use serde::Serialize;
use tracing::{error, info, warn};

/// HTTP status the provider answers with when a message was accepted
const STATUS_OK: u16 = 200;

/// Result of a public send operation
///
/// `Sent(true)` means the provider answered 200, `Sent(false)` any other
/// status. `Failed` carries the message of an error raised along the way.
/// Serializes as a bare JSON boolean or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SendOutcome {
    Sent(bool),
    Failed(String),
}

impl SendOutcome {
    /// True only when the provider accepted the message
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent(true))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SendOutcome::Failed(message) => Some(message),
            SendOutcome::Sent(_) => None,
        }
    }
}

impl From<Result<bool>> for SendOutcome {
    fn from(result: Result<bool>) -> Self {
        match result {
            Ok(sent) => SendOutcome::Sent(sent),
            Err(e) => SendOutcome::Failed(e.to_string()),
        }
    }
}

impl From<MailError> for SendOutcome {
    fn from(err: MailError) -> Self {
        SendOutcome::Failed(err.to_string())
    }
}

/// Sends mail-merged messages through a mail provider
pub struct Mailer<P> {
    provider: P,
}

impl<P: MailProvider> Mailer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Merge `template` and send it
    pub async fn send_email(
        &self,
        template: &Template,
        recipients: &Recipients,
        alias: Option<&Alias>,
        fields: &MergeFields,
    ) -> SendOutcome {
        let result = self.try_send_email(template, recipients, alias, fields).await;
        if let Err(e) = &result {
            error!("Failed to send email: {}", e);
        }
        result.into()
    }

    /// Merge the draft matching `subject_query` and send it
    pub async fn send_email_from_draft(
        &self,
        subject_query: &str,
        recipients: &Recipients,
        alias: Option<&Alias>,
        fields: &MergeFields,
    ) -> SendOutcome {
        let result = self
            .try_send_email_from_draft(subject_query, recipients, alias, fields)
            .await;
        if let Err(e) = &result {
            error!("Failed to send email from draft {:?}: {:?}", subject_query, e);
        }
        result.into()
    }

    /// Typed variant of [`Mailer::send_email`]
    ///
    /// Merge fields are validated before any network call.
    pub async fn try_send_email(
        &self,
        template: &Template,
        recipients: &Recipients,
        alias: Option<&Alias>,
        fields: &MergeFields,
    ) -> Result<bool> {
        let message = MessageEncoder::encode(template, recipients, alias, fields)?;
        let service = self.provider.authenticate().await?;
        send(service.as_ref(), &message).await
    }

    /// Typed variant of [`Mailer::send_email_from_draft`]
    pub async fn try_send_email_from_draft(
        &self,
        subject_query: &str,
        recipients: &Recipients,
        alias: Option<&Alias>,
        fields: &MergeFields,
    ) -> Result<bool> {
        let service = self.provider.authenticate().await?;
        let draft = drafts::find_draft_by_subject(service.as_ref(), subject_query).await?;
        let template = drafts::extract_template(&draft)?;
        let message = MessageEncoder::encode(&template, recipients, alias, fields)?;
        send(service.as_ref(), &message).await
    }
}

/// Submit an encoded message; `true` iff the provider answered 200
pub async fn send(service: &dyn MailService, message: &EncodedMessage) -> Result<bool> {
    let status = service.send_raw(message).await?;

    if status == STATUS_OK {
        info!("Message accepted by provider");
        Ok(true)
    } else {
        warn!("Message not accepted, provider answered {}", status);
        Ok(false)
    }
}
