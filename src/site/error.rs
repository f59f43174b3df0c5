//! Error types for the site client layer

use thiserror::Error;

use crate::error::{ErrorCode, ProvisionError};

/// Result type for site operations
pub type SiteResult<T> = Result<T, SiteError>;

#[derive(Error, Debug)]
pub enum SiteError {
    /// The site did not advertise a tenant realm
    #[error("Could not discover tenant realm for {0}")]
    RealmNotFound(String),

    /// Token endpoint refused the client credentials
    #[error("App-only authentication failed ({status}): {body}")]
    Authentication { status: u16, body: String },

    /// Non-success status from a site endpoint
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// List lookup by title failed
    #[error("List '{0}' was not found")]
    ListNotFound(String),

    /// Body did not have the expected shape
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SiteError {
    pub fn invalid_response<E: std::fmt::Display>(msg: E) -> Self {
        Self::InvalidResponse(msg.to_string())
    }
}

impl From<SiteError> for ProvisionError {
    fn from(err: SiteError) -> Self {
        let code = match &err {
            SiteError::RealmNotFound(_) => ErrorCode::SITE_REALM_NOT_FOUND,
            SiteError::Authentication { .. } => ErrorCode::SITE_AUTH_FAILED,
            SiteError::Status { .. } | SiteError::Transport(_) => ErrorCode::SITE_REQUEST_FAILED,
            SiteError::ListNotFound(_) => ErrorCode::SITE_LIST_NOT_FOUND,
            SiteError::InvalidResponse(_) => ErrorCode::SITE_INVALID_RESPONSE,
            SiteError::InvalidUrl(_) => ErrorCode::SITE_GENERIC,
        };

        ProvisionError::site_with_code(code, err.to_string(), None).with_source(err)
    }
}
