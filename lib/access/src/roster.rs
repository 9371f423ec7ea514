//! Roster management: listing, adding, and removing administrators.
//!
//! Adding an admin must not disturb the acting administrator's own live
//! session, so the new credential is created on an isolated secondary
//! provider session which is discarded (best-effort) once the record is
//! written. The roster manager only ever touches admin *records*; destroying
//! a removed admin's identity is the coordinator's job, the next time that
//! identity surfaces.

use crate::admin::{AdminDirectory, AdminRecord, AdminRecordDraft};
use crate::error::{ProviderError, RosterError};
use crate::identity::IdentityProvider;
use quizpress_core::Uid;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// CRUD wrapper around the admin directory.
pub struct RosterManager {
    provider: Arc<dyn IdentityProvider>,
    directory: Arc<dyn AdminDirectory>,
    /// Email of the protected super admin, if configured. That record can
    /// never be removed through the roster.
    protected_email: Option<String>,
}

impl RosterManager {
    /// Creates a roster manager.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, directory: Arc<dyn AdminDirectory>) -> Self {
        Self {
            provider,
            directory,
            protected_email: None,
        }
    }

    /// Marks one email as the protected super admin.
    #[must_use]
    pub fn with_protected_email(mut self, email: impl Into<String>) -> Self {
        self.protected_email = Some(email.into());
        self
    }

    /// Lists all administrators.
    ///
    /// # Errors
    ///
    /// Returns a roster error if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<AdminRecord>, Report<RosterError>> {
        let records = self
            .directory
            .list()
            .await
            .map_err(|error| RosterError::Directory {
                reason: error.to_string(),
            })?;
        Ok(records)
    }

    /// Adds a new administrator without disturbing the primary session.
    ///
    /// Creates the credential on a secondary session, writes the record
    /// keyed by the new identity's uid with the acting admin recorded as
    /// creator, then reads the record back to resolve the server-assigned
    /// timestamp. The secondary session is discarded best-effort.
    ///
    /// # Errors
    ///
    /// Fails with `RosterError::NotAuthenticated` when no acting identity is
    /// signed in, and `RosterError::EmailInUse` when the email already has
    /// an account.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn add(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AdminRecord, Report<RosterError>> {
        let acting = self
            .provider
            .current_identity()
            .ok_or(RosterError::NotAuthenticated)?;

        let secondary = self.provider.secondary();
        let created = match secondary.create_account(email, password).await {
            Ok(identity) => identity,
            Err(ProviderError::EmailInUse { email }) => {
                return Err(RosterError::EmailInUse { email }.into());
            }
            Err(error) => {
                return Err(RosterError::Provider {
                    reason: error.to_string(),
                }
                .into());
            }
        };

        let draft = AdminRecordDraft {
            email: created.email().to_string(),
            display_name: display_name.map(str::to_string),
            created_by: Some(acting.uid().clone()),
        };
        self.directory
            .put(created.uid(), &draft)
            .await
            .map_err(|error| RosterError::Directory {
                reason: error.to_string(),
            })?;

        // Read back to resolve the server-assigned creation timestamp.
        let record = self
            .directory
            .get(created.uid())
            .await
            .map_err(|error| RosterError::Directory {
                reason: error.to_string(),
            })?
            .ok_or_else(|| RosterError::MissingRecord {
                uid: created.uid().clone(),
            })?;

        // Discard the throwaway session; a failure here is not the caller's
        // problem.
        if let Err(error) = secondary.sign_out().await {
            debug!(%error, "failed to discard secondary session");
        }

        info!(uid = %record.uid(), "administrator added");
        Ok(record)
    }

    /// Removes an administrator's record.
    ///
    /// The identity itself stays alive until the coordinator's next
    /// enforcement cycle for it.
    ///
    /// # Errors
    ///
    /// Fails when unauthenticated, when the record belongs to the protected
    /// super admin, or when the directory rejects the delete.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn remove(&self, uid: &Uid) -> Result<(), Report<RosterError>> {
        if self.provider.current_identity().is_none() {
            return Err(RosterError::NotAuthenticated.into());
        }

        if let Some(protected) = &self.protected_email {
            let record =
                self.directory
                    .get(uid)
                    .await
                    .map_err(|error| RosterError::Directory {
                        reason: error.to_string(),
                    })?;
            if let Some(record) = record {
                if record.email().eq_ignore_ascii_case(protected) {
                    return Err(RosterError::Protected {
                        email: record.email().to_string(),
                    }
                    .into());
                }
            }
        }

        self.directory
            .delete(uid)
            .await
            .map_err(|error| RosterError::Directory {
                reason: error.to_string(),
            })?;

        info!("administrator record removed");
        Ok(())
    }
}
