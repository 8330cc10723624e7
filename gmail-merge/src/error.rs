use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid Merge Fields Provided. Missing fields: {}.", .0.join(", "))]
    MissingMergeFields(Vec<String>),

    #[error("No draft found.")]
    NoDraftFound,

    #[error("More than one draft found! Please refine query.")]
    AmbiguousDraftQuery,

    #[error("Cannot send attachment with this method.")]
    AttachmentUnsupported,

    #[error("Malformed draft: {0}")]
    MalformedDraft(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mail API error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<config::ConfigError> for MailError {
    fn from(err: config::ConfigError) -> Self {
        MailError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
