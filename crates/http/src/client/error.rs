//! Client error types

use thiserror::Error;

/// Transport and API error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the caller should treat this as "not signed in"
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

/// Failures of sign-in and sign-up that the UI is expected to render
///
/// `Display` yields the user-facing message. `status` is `None` when the
/// backend could not be reached at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Credentials were rejected, or no usable session came back
    #[error("{message}")]
    Authentication {
        message: String,
        status: Option<u16>,
    },

    /// Account creation was rejected (duplicate email, missing fields, ...)
    #[error("{message}")]
    Registration {
        message: String,
        status: Option<u16>,
    },
}

impl SessionError {
    pub(crate) const LOGIN_FAILED: &'static str = "Login failed";
    pub(crate) const REGISTRATION_FAILED: &'static str = "Registration failed";

    /// Sign-in failure, falling back to a generic message when the backend sent none
    pub fn authentication(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Authentication {
            message: non_empty_or(message.into(), Self::LOGIN_FAILED),
            status,
        }
    }

    /// Registration failure, falling back to a generic message when the backend sent none
    pub fn registration(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Registration {
            message: non_empty_or(message.into(), Self::REGISTRATION_FAILED),
            status,
        }
    }

    /// HTTP status reported by the backend, if it answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Registration { status, .. } => *status,
        }
    }

    /// The user-displayable message
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message, .. } | Self::Registration { message, .. } => message,
        }
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
