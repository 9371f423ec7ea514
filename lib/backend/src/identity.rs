//! Identity-toolkit REST client.
//!
//! Implements the primary and secondary identity-provider sessions over the
//! hosted email/password account API. Session-change notifications are
//! process-local: the hosted API has no push channel, so the client publishes
//! a replacement value on every sign-in, sign-out, and account deletion it
//! performs itself, with the current value observable immediately — the same
//! semantics the provider's own SDKs give.

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::http::{decode, transport};
use async_trait::async_trait;
use quizpress_access::{Identity, IdentityProvider, ProviderError, SecondarySession, SessionChanges};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, instrument};

const SIGN_IN_ENDPOINT: &str = "v1/accounts:signInWithPassword";
const SIGN_UP_ENDPOINT: &str = "v1/accounts:signUp";
const DELETE_ENDPOINT: &str = "v1/accounts:delete";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    id_token: &'a str,
}

/// Supplies the bearer token for document-store calls made on behalf of the
/// current identity.
pub trait TokenSource: Send + Sync {
    /// Returns the current session's ID token, if signed in.
    fn id_token(&self) -> Option<String>;
}

/// Primary identity-provider session over the hosted account API.
pub struct IdentityClient {
    http: reqwest::Client,
    config: BackendConfig,
    current: watch::Sender<Option<Identity>>,
}

impl IdentityClient {
    /// Creates a signed-out client.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            config,
            current,
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, BackendError> {
        post_identity(&self.http, &self.config, endpoint, body).await
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    #[instrument(skip_all, fields(email = %email))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let response: AuthResponse = self
            .post(
                SIGN_IN_ENDPOINT,
                &CredentialRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await
            .map_err(map_sign_in_error)?;

        let identity = Identity::new(
            response.local_id.into(),
            response.email.unwrap_or_else(|| email.to_string()),
        )
        .with_id_token(response.id_token);
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        // Session revocation is local: the hosted API keeps no server-side
        // session, only the bearer token we drop here.
        if self.current.send_replace(None).is_some() {
            debug!("signed out");
        }
        Ok(())
    }

    #[instrument(skip_all, fields(uid = %identity.uid()))]
    async fn delete_account(&self, identity: &Identity) -> Result<(), ProviderError> {
        let id_token = identity
            .id_token()
            .ok_or_else(|| ProviderError::DeletionRejected {
                reason: "identity carries no token for a destructive call".to_string(),
            })?;

        let _: serde_json::Value = self
            .post(DELETE_ENDPOINT, &DeleteRequest { id_token })
            .await
            .map_err(map_delete_error)?;

        let current_matches = self
            .current
            .borrow()
            .as_ref()
            .is_some_and(|current| current.uid() == identity.uid());
        if current_matches {
            self.current.send_replace(None);
        }
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn session_changes(&self) -> SessionChanges {
        self.current.subscribe()
    }

    fn secondary(&self) -> Box<dyn SecondarySession> {
        Box::new(SecondaryIdentityClient {
            http: self.http.clone(),
            config: self.config.clone(),
            session: Mutex::new(None),
        })
    }
}

impl TokenSource for IdentityClient {
    fn id_token(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .and_then(|identity| identity.id_token().map(str::to_string))
    }
}

/// Isolated secondary session sharing only the HTTP client and API key.
struct SecondaryIdentityClient {
    http: reqwest::Client,
    config: BackendConfig,
    session: Mutex<Option<Identity>>,
}

#[async_trait]
impl SecondarySession for SecondaryIdentityClient {
    #[instrument(skip_all, fields(email = %email))]
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let response: AuthResponse = post_identity(
            &self.http,
            &self.config,
            SIGN_UP_ENDPOINT,
            &CredentialRequest {
                email,
                password,
                return_secure_token: true,
            },
        )
        .await
        .map_err(|error| map_sign_up_error(error, email))?;

        let identity = Identity::new(
            response.local_id.into(),
            response.email.unwrap_or_else(|| email.to_string()),
        )
        .with_id_token(response.id_token);
        // The new credential lives on this context only; the primary
        // session's watch channel never hears about it.
        *self
            .session
            .lock()
            .map_err(|_| ProviderError::Unavailable {
                reason: "secondary session state poisoned".to_string(),
            })? = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let discarded = self
            .session
            .lock()
            .map_err(|_| ProviderError::Unavailable {
                reason: "secondary session state poisoned".to_string(),
            })?
            .take();
        if let Some(identity) = discarded {
            debug!(uid = %identity.uid(), "secondary session discarded");
        }
        Ok(())
    }
}

async fn post_identity<T: DeserializeOwned>(
    http: &reqwest::Client,
    config: &BackendConfig,
    endpoint: &str,
    body: &impl Serialize,
) -> Result<T, BackendError> {
    let url = format!(
        "{}/{}?key={}",
        config.identity_url, endpoint, config.api_key
    );
    let response = http.post(&url).json(body).send().await.map_err(transport)?;
    decode(response).await
}

fn map_sign_in_error(error: BackendError) -> ProviderError {
    match error.api_code() {
        Some(
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
            | "USER_DISABLED",
        ) => ProviderError::InvalidCredentials,
        _ => ProviderError::Unavailable {
            reason: error.to_string(),
        },
    }
}

fn map_sign_up_error(error: BackendError, email: &str) -> ProviderError {
    match error.api_code() {
        Some("EMAIL_EXISTS") => ProviderError::EmailInUse {
            email: email.to_string(),
        },
        _ => ProviderError::Unavailable {
            reason: error.to_string(),
        },
    }
}

fn map_delete_error(error: BackendError) -> ProviderError {
    match error.api_code() {
        Some(
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN"
            | "USER_NOT_FOUND",
        ) => ProviderError::DeletionRejected {
            reason: error.to_string(),
        },
        _ => ProviderError::Unavailable {
            reason: error.to_string(),
        },
    }
}
