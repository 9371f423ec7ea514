//! HTTP-facing error type for the API routes.
//!
//! Domain errors cross the route boundary exactly once, here, where each
//! variant picks its status code and a user-safe message. Internal detail
//! stays in the logs.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quizpress_access::{LoginError, ProviderError, RosterError};
use quizpress_catalog::CatalogError;
use rootcause::prelude::Report;
use serde::Serialize;
use tracing::warn;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// 401: bad email/password pair.
    InvalidCredentials,
    /// 403: valid credentials, but access has been revoked.
    AccessRevoked,
    /// 401: the operation requires a signed-in administrator.
    NotAuthenticated,
    /// 403: the target record is protected from removal.
    Protected { message: String },
    /// 404: no such resource.
    NotFound { message: String },
    /// 409: the request conflicts with existing state.
    Conflict { message: String },
    /// 503: a backing service could not be reached.
    Unavailable { message: String },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::AccessRevoked | Self::Protected { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidCredentials => "invalid email or password".to_string(),
            Self::AccessRevoked => {
                "your admin access has been revoked; contact a super admin".to_string()
            }
            Self::NotAuthenticated => "not authenticated".to_string(),
            Self::Protected { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Unavailable { message } => message.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(%status, error = %self.message(), "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

impl From<Report<LoginError>> for ApiError {
    fn from(report: Report<LoginError>) -> Self {
        match report.current_context() {
            LoginError::InvalidCredentials => Self::InvalidCredentials,
            LoginError::Provider { .. } | LoginError::DirectoryUnavailable { .. } => {
                Self::Unavailable {
                    message: "sign-in is temporarily unavailable".to_string(),
                }
            }
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::InvalidCredentials => Self::InvalidCredentials,
            ProviderError::NotSignedIn => Self::NotAuthenticated,
            _ => Self::Unavailable {
                message: "the identity provider is temporarily unavailable".to_string(),
            },
        }
    }
}

impl From<Report<RosterError>> for ApiError {
    fn from(report: Report<RosterError>) -> Self {
        match report.current_context() {
            RosterError::NotAuthenticated => Self::NotAuthenticated,
            RosterError::EmailInUse { email } => Self::Conflict {
                message: format!("an account already exists for '{email}'"),
            },
            RosterError::Protected { email } => Self::Protected {
                message: format!("'{email}' is the super admin and cannot be removed"),
            },
            RosterError::MissingRecord { .. }
            | RosterError::Provider { .. }
            | RosterError::Directory { .. } => Self::Unavailable {
                message: "the admin roster is temporarily unavailable".to_string(),
            },
        }
    }
}

impl From<Report<CatalogError>> for ApiError {
    fn from(report: Report<CatalogError>) -> Self {
        match report.current_context() {
            CatalogError::NotFound { id } => Self::NotFound {
                message: format!("quiz '{id}' not found"),
            },
            CatalogError::Store { .. } => Self::Unavailable {
                message: "the quiz catalog is temporarily unavailable".to_string(),
            },
        }
    }
}
