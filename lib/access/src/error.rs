//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ProviderError`: failures from the hosted identity provider
//! - `DirectoryError`: failures reading or writing the admin directory
//! - `EnforcementError`: failures of an enforcement cycle itself
//! - `LoginError`: failures surfaced to login callers
//! - `RosterError`: failures from roster management operations

use quizpress_core::Uid;
use std::fmt;

/// Errors from the hosted identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The email/password pair was rejected at sign-in.
    InvalidCredentials,
    /// Account creation was rejected because the email is already in use.
    EmailInUse { email: String },
    /// The provider refused a hard account deletion, e.g. because the
    /// session is too old for a destructive operation.
    DeletionRejected { reason: String },
    /// The operation requires a live session and none exists.
    NotSignedIn,
    /// The provider could not be reached or returned an unexpected response.
    Unavailable { reason: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => {
                write!(f, "invalid email or password")
            }
            Self::EmailInUse { email } => {
                write!(f, "an account already exists for '{email}'")
            }
            Self::DeletionRejected { reason } => {
                write!(f, "account deletion rejected: {reason}")
            }
            Self::NotSignedIn => {
                write!(f, "no live identity session")
            }
            Self::Unavailable { reason } => {
                write!(f, "identity provider unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors from the admin directory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The store could not be reached or returned an unexpected response.
    Unavailable { reason: String },
    /// The store rejected the operation.
    Denied { reason: String },
    /// A stored record could not be decoded.
    InvalidRecord { key: String, reason: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "admin directory unavailable: {reason}")
            }
            Self::Denied { reason } => {
                write!(f, "admin directory denied the operation: {reason}")
            }
            Self::InvalidRecord { key, reason } => {
                write!(f, "invalid admin record '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Errors from a single enforcement cycle.
///
/// Deletion rejection is not represented here: it is recovered locally by
/// falling back to sign-out and never surfaces as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnforcementError {
    /// The admin directory could not be read; the cycle failed closed.
    DirectoryUnavailable { reason: String },
}

impl fmt::Display for EnforcementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryUnavailable { reason } => {
                write!(f, "admin check failed: {reason}")
            }
        }
    }
}

impl std::error::Error for EnforcementError {}

/// Errors surfaced from the login operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Bad credentials; session state is unchanged.
    InvalidCredentials,
    /// The identity provider failed for another reason.
    Provider { reason: String },
    /// The admin directory could not be read during enforcement.
    DirectoryUnavailable { reason: String },
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => {
                write!(f, "invalid email or password")
            }
            Self::Provider { reason } => {
                write!(f, "sign-in failed: {reason}")
            }
            Self::DirectoryUnavailable { reason } => {
                write!(f, "admin check failed: {reason}")
            }
        }
    }
}

impl std::error::Error for LoginError {}

/// Errors from roster management operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// No acting identity is signed in.
    NotAuthenticated,
    /// The email is already in use by an existing account.
    EmailInUse { email: String },
    /// The record belongs to the protected super admin and cannot be removed.
    Protected { email: String },
    /// The record written for a new admin could not be read back.
    MissingRecord { uid: Uid },
    /// The identity provider failed.
    Provider { reason: String },
    /// The admin directory failed.
    Directory { reason: String },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "not authenticated")
            }
            Self::EmailInUse { email } => {
                write!(f, "an account already exists for '{email}'")
            }
            Self::Protected { email } => {
                write!(f, "'{email}' is the protected super admin and cannot be removed")
            }
            Self::MissingRecord { uid } => {
                write!(f, "admin record for '{uid}' missing after write")
            }
            Self::Provider { reason } => {
                write!(f, "identity provider error: {reason}")
            }
            Self::Directory { reason } => {
                write!(f, "admin directory error: {reason}")
            }
        }
    }
}

impl std::error::Error for RosterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_invalid_credentials_display() {
        let err = ProviderError::InvalidCredentials;
        assert!(err.to_string().contains("invalid email or password"));
    }

    #[test]
    fn provider_error_deletion_rejected_display() {
        let err = ProviderError::DeletionRejected {
            reason: "credential too old".to_string(),
        };
        assert!(err.to_string().contains("deletion rejected"));
        assert!(err.to_string().contains("credential too old"));
    }

    #[test]
    fn directory_error_unavailable_display() {
        let err = DirectoryError::Unavailable {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn roster_error_protected_display() {
        let err = RosterError::Protected {
            email: "root@example.com".to_string(),
        };
        assert!(err.to_string().contains("root@example.com"));
        assert!(err.to_string().contains("cannot be removed"));
    }

    #[test]
    fn roster_error_missing_record_display() {
        let err = RosterError::MissingRecord { uid: "u9".into() };
        assert!(err.to_string().contains("u9"));
    }
}
