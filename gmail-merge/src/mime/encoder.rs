//! Raw message construction for the Gmail `messages.send` endpoint

use crate::error::Result;
use crate::mime::{Alias, EncodedMessage, Recipients};
use crate::templates::{MergeFields, Template, TemplateRenderer};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::debug;

pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const MIME_VERSION: &str = "1.0";

/// Builds and encodes outgoing messages
pub struct MessageEncoder;

impl MessageEncoder {
    /// Merge the template and encode the resulting message
    ///
    /// Fails only when merge fields are missing.
    pub fn encode(
        template: &Template,
        recipients: &Recipients,
        alias: Option<&Alias>,
        fields: &MergeFields,
    ) -> Result<EncodedMessage> {
        let merged = TemplateRenderer::populate(template, fields)?;
        let message = Self::build_message(&merged, recipients, alias);

        debug!(
            "Encoded message for to={:?} cc={:?} ({} bytes)",
            recipients.to,
            recipients.cc,
            message.len()
        );

        Ok(EncodedMessage::from_text(&message))
    }

    /// Assemble header block and body, joined with `\n`
    pub fn build_message(
        merged: &Template,
        recipients: &Recipients,
        alias: Option<&Alias>,
    ) -> String {
        let lines = [
            format!("To:  {}", recipients.to),
            format!("Cc:  {}", recipients.cc),
            format!("Bcc: {}", recipients.bcc),
            Self::from_header(alias),
            format!("Content-Type: {}", CONTENT_TYPE),
            format!("MIME-Version: {}", MIME_VERSION),
            format!("Subject: {}", Self::encode_subject(&merged.subject)),
            String::new(),
            merged.body.clone(),
        ];

        lines.join("\n")
    }

    /// RFC 2047 encoded-word, applied to every subject
    pub fn encode_subject(subject: &str) -> String {
        format!("=?utf-8?B?{}?=", BASE64.encode(subject.as_bytes()))
    }

    fn from_header(alias: Option<&Alias>) -> String {
        match alias {
            Some(alias) => format!("From: {} <{}>", alias.name, alias.email),
            None => "From:".to_string(),
        }
    }
}
