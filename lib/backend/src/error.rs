//! Error types for the backend clients.

use std::fmt;

/// Errors from a hosted-backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request never produced a usable response.
    Http { reason: String },
    /// The backend answered with an error payload.
    Api { status: u16, message: String },
    /// The response body could not be decoded.
    Decode { reason: String },
}

impl BackendError {
    /// True when the backend reported the target document as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// The backend's error message code, e.g. `EMAIL_EXISTS`.
    ///
    /// Identity-toolkit messages are an upper-case code optionally followed
    /// by a colon and free text; only the code part is returned.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.split([':', ' ']).next().map(str::trim),
            _ => None,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { reason } => {
                write!(f, "backend request failed: {reason}")
            }
            Self::Api { status, message } => {
                write!(f, "backend error {status}: {message}")
            }
            Self::Decode { reason } => {
                write!(f, "failed to decode backend response: {reason}")
            }
        }
    }
}

impl std::error::Error for BackendError {}
