//! API error types

use miette::Diagnostic;
use thiserror::Error;

use crate::core::cache::CacheError;
use crate::core::session::SessionError;

/// Message shown whenever no response was received
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// A failed API call, normalized to a displayable message
#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    /// 422 - the first message of the first invalid field
    #[error("{message}")]
    #[diagnostic(code(cdesk::api::validation))]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// 401 on the login or register form
    #[error("{0}")]
    #[diagnostic(code(cdesk::api::unauthorized), help("check the email and password"))]
    Unauthorized(String),

    /// 401 anywhere else; credentials have been cleared
    #[error("Your session has expired. Please log in again.")]
    #[diagnostic(code(cdesk::api::session_expired), help("run `cdesk login`"))]
    SessionExpired,

    #[error("{0}")]
    #[diagnostic(code(cdesk::api::forbidden))]
    Forbidden(String),

    #[error("{0}")]
    #[diagnostic(code(cdesk::api::not_found))]
    NotFound(String),

    #[error("{message}")]
    #[diagnostic(code(cdesk::api::server))]
    Server { status: u16, message: String },

    /// Any other non-2xx status
    #[error("{message}")]
    #[diagnostic(code(cdesk::api::http))]
    Http { status: u16, message: String },

    #[error("{}", NETWORK_ERROR_MESSAGE)]
    #[diagnostic(
        code(cdesk::api::network),
        help("is the API reachable? check `cdesk config show`")
    )]
    Network { detail: String },

    /// Response did not have a recognized envelope shape
    #[error("unexpected response: {0}")]
    #[diagnostic(code(cdesk::api::envelope))]
    Envelope(String),

    #[error("cannot decode response: {0}")]
    #[diagnostic(code(cdesk::api::decode))]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(cdesk::cache))]
    Cache(#[from] CacheError),

    #[error(transparent)]
    #[diagnostic(code(cdesk::session))]
    Session(#[from] SessionError),

    #[error("invalid URL: {0}")]
    #[diagnostic(code(cdesk::api::url), help("set a full http(s) URL with `cdesk config set-url`"))]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(422),
            ApiError::Unauthorized(_) | ApiError::SessionExpired => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } | ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

/// Failure of a two-step save (field update, then file upload)
#[derive(Debug, Error, Diagnostic)]
pub enum StepError {
    /// Nothing was saved
    #[error("update failed: {0}")]
    #[diagnostic(code(cdesk::step::fields))]
    FieldUpdate(#[source] ApiError),

    /// Fields were saved; the file was not
    #[error("fields saved, but the file upload failed: {source}")]
    #[diagnostic(
        code(cdesk::step::upload),
        help("retry the upload alone; the other changes are already saved")
    )]
    FileUpload {
        #[source]
        source: ApiError,
    },
}

impl StepError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            StepError::FieldUpdate(e) => e,
            StepError::FileUpload { source } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_message_is_fixed() {
        let err = ApiError::Network {
            detail: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "Network error. Please check your connection.");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_step_errors_name_the_step() {
        let fields = StepError::FieldUpdate(ApiError::NotFound("Clinic not found".into()));
        assert_eq!(fields.to_string(), "update failed: Clinic not found");

        let upload = StepError::FileUpload {
            source: ApiError::Validation {
                message: "The photo must be an image.".into(),
                field: Some("photo".into()),
            },
        };
        assert!(upload.to_string().starts_with("fields saved"));
        assert_eq!(upload.api_error().status(), Some(422));
    }
}
