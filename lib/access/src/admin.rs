//! Admin records and the admin-directory contract.
//!
//! The directory is a document collection keyed by identity token, one record
//! per administrator. Presence of a record for a given uid is what makes that
//! uid an administrator; there is no indirection and no separate role field.

use crate::error::DirectoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quizpress_core::Uid;
use serde::{Deserialize, Serialize};

/// One authorized administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    /// Identity token of the authorized account. Doubles as the document key.
    uid: Uid,
    email: String,
    display_name: Option<String>,
    /// Assigned by the store at write time; never client-supplied.
    created_at: DateTime<Utc>,
    /// Audit trail only, not enforced.
    created_by: Option<Uid>,
}

impl AdminRecord {
    /// Assembles a record as read back from the store.
    #[must_use]
    pub fn new(
        uid: Uid,
        email: impl Into<String>,
        display_name: Option<String>,
        created_at: DateTime<Utc>,
        created_by: Option<Uid>,
    ) -> Self {
        Self {
            uid,
            email: email.into(),
            display_name,
            created_at,
            created_by,
        }
    }

    /// Returns the authorized identity token.
    #[must_use]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Returns the admin's email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the optional display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the server-assigned creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the creator's identity token, if recorded.
    #[must_use]
    pub fn created_by(&self) -> Option<&Uid> {
        self.created_by.as_ref()
    }
}

/// The write shape for a new admin record.
///
/// The creation timestamp is deliberately absent: the store assigns it at
/// write time, and callers read the record back to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecordDraft {
    pub email: String,
    pub display_name: Option<String>,
    pub created_by: Option<Uid>,
}

/// The admin directory store.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Fetches the record keyed by the given uid, if present.
    async fn get(&self, uid: &Uid) -> Result<Option<AdminRecord>, DirectoryError>;

    /// Lists all admin records.
    async fn list(&self) -> Result<Vec<AdminRecord>, DirectoryError>;

    /// Writes a record keyed by the given uid, stamping the creation time
    /// server-side.
    async fn put(&self, uid: &Uid, draft: &AdminRecordDraft) -> Result<(), DirectoryError>;

    /// Deletes the record keyed by the given uid. A no-op if absent.
    async fn delete(&self, uid: &Uid) -> Result<(), DirectoryError>;
}
