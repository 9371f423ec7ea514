//! Identity-provider contracts.
//!
//! The hosted identity provider owns all accounts; the application holds only
//! transient, non-owning references to the currently signed-in principal. Two
//! independently-lifetimed session contexts exist: the primary session (the
//! acting administrator) and a lazily-constructed secondary session used to
//! create a new administrator's credentials without disturbing the primary.

use crate::error::ProviderError;
use async_trait::async_trait;
use quizpress_core::Uid;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A transient reference to one authenticated principal.
///
/// Valid only for the duration of a session; the underlying account can be
/// destroyed at any time by the enforcement protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    uid: Uid,
    email: String,
    /// Bearer token for backend calls made on behalf of this identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
}

impl Identity {
    /// Creates an identity reference.
    #[must_use]
    pub fn new(uid: Uid, email: impl Into<String>) -> Self {
        Self {
            uid,
            email: email.into(),
            id_token: None,
        }
    }

    /// Attaches the provider-issued ID token.
    #[must_use]
    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Returns the provider-assigned identity token.
    #[must_use]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the ID token, if one was issued.
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }
}

/// Conflated session-change notification stream.
///
/// The current value is observable immediately on subscription, matching the
/// provider's "fires immediately" semantic; every sign-in, sign-out, and
/// account deletion publishes a full replacement value.
pub type SessionChanges = watch::Receiver<Option<Identity>>;

/// The primary identity-provider session.
///
/// Implementations serialize destructive calls against the same account, so
/// the coordinator needs no locking of its own.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates with email and password, replacing the current session.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidCredentials` for a bad email/password
    /// pair; the current session is left untouched on failure.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    /// Revokes the current session. Idempotent; a no-op when signed out.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Hard-deletes the account behind the given identity.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::DeletionRejected` when the provider refuses
    /// the deletion, e.g. because it requires recent re-authentication.
    async fn delete_account(&self, identity: &Identity) -> Result<(), ProviderError>;

    /// Returns the currently signed-in principal, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Subscribes to session-change notifications.
    fn session_changes(&self) -> SessionChanges;

    /// Constructs an isolated secondary session context.
    ///
    /// The secondary context shares provider credentials but never touches
    /// the primary session; callers discard it after use.
    fn secondary(&self) -> Box<dyn SecondarySession>;
}

/// An isolated, throwaway identity-provider session.
///
/// Used to create a new administrator's credentials while the acting
/// administrator stays signed in on the primary session.
#[async_trait]
pub trait SecondarySession: Send + Sync {
    /// Creates a new account and signs it in on this session only.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::EmailInUse` if an account already exists for
    /// the email.
    async fn create_account(&self, email: &str, password: &str)
    -> Result<Identity, ProviderError>;

    /// Discards this session. Best-effort; failures are not fatal.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_accessors() {
        let identity = Identity::new("u1".into(), "a@x.com").with_id_token("tok_123");
        assert_eq!(identity.uid().as_str(), "u1");
        assert_eq!(identity.email(), "a@x.com");
        assert_eq!(identity.id_token(), Some("tok_123"));
    }

    #[test]
    fn identity_without_token() {
        let identity = Identity::new("u1".into(), "a@x.com");
        assert!(identity.id_token().is_none());
    }

    #[test]
    fn identity_serialization_omits_missing_token() {
        let identity = Identity::new("u1".into(), "a@x.com");
        let json = serde_json::to_string(&identity).expect("serialize");
        assert!(!json.contains("id_token"));
    }
}
