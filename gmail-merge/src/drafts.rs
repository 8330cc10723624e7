//! Draft lookup by subject and extraction of a reusable template

use crate::error::{MailError, Result};
use crate::gmail::{Draft, MailService};
use crate::templates::Template;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tracing::{debug, info};

/// Index of the body part holding the HTML content
const BODY_PART_INDEX: usize = 1;

/// Find the single draft whose subject matches `query`
///
/// Fails with [`MailError::NoDraftFound`] when nothing matches and with
/// [`MailError::AmbiguousDraftQuery`] when more than one draft does.
pub async fn find_draft_by_subject(service: &dyn MailService, query: &str) -> Result<Draft> {
    let drafts = service.list_drafts(&format!("subject:{}", query)).await?;

    let draft_ref = match drafts.as_slice() {
        [] => return Err(MailError::NoDraftFound),
        [single] => single,
        _ => {
            debug!("{} drafts match {:?}", drafts.len(), query);
            return Err(MailError::AmbiguousDraftQuery);
        }
    };

    let draft = service.get_draft(&draft_ref.id).await?;
    info!("Resolved draft {} for query {:?}", draft.id, query);

    Ok(draft)
}

/// Extract subject and decoded HTML body from a draft
///
/// Fails with [`MailError::AttachmentUnsupported`] when the body part is an
/// attachment; this check runs before anything else is read.
pub fn extract_template(draft: &Draft) -> Result<Template> {
    let payload = &draft.message.payload;
    let part = payload.parts.get(BODY_PART_INDEX).ok_or_else(|| {
        MailError::MalformedDraft(format!(
            "draft {} has {} body part(s), expected at least {}",
            draft.id,
            payload.parts.len(),
            BODY_PART_INDEX + 1
        ))
    })?;

    if part.body.has_attachment() {
        return Err(MailError::AttachmentUnsupported);
    }

    let subject = payload.header("Subject").ok_or_else(|| {
        MailError::MalformedDraft(format!("draft {} has no Subject header", draft.id))
    })?;

    let data = part.body.data.as_deref().ok_or_else(|| {
        MailError::MalformedDraft(format!("draft {} body part has no inline data", draft.id))
    })?;

    Ok(Template::new(subject, decode_body(data)?))
}

/// Decode part data in either base64 alphabet, with or without padding
fn decode_body(data: &str) -> Result<String> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD.decode(normalized.as_bytes())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
