//! In-memory fakes for the external collaborators, shared by the
//! coordinator and roster test suites.

use crate::admin::{AdminDirectory, AdminRecord, AdminRecordDraft};
use crate::error::{DirectoryError, ProviderError};
use crate::identity::{Identity, IdentityProvider, SecondarySession, SessionChanges};
use async_trait::async_trait;
use chrono::Utc;
use quizpress_core::Uid;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct FakeAccount {
    uid: Uid,
    password: String,
}

/// Shared state behind a fake provider and its secondary sessions.
pub(crate) struct ProviderState {
    accounts: Mutex<HashMap<String, FakeAccount>>,
    current: watch::Sender<Option<Identity>>,
    next_uid: AtomicUsize,
    /// Forces `delete_account` to report `DeletionRejected`.
    pub reject_delete: AtomicBool,
    /// Forces secondary-session sign-out to fail.
    pub fail_secondary_sign_out: AtomicBool,
    pub delete_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub secondary_sign_outs: AtomicUsize,
}

/// Fake primary identity-provider session.
#[derive(Clone)]
pub(crate) struct FakeProvider(Arc<ProviderState>);

impl FakeProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self(Arc::new(ProviderState {
            accounts: Mutex::new(HashMap::new()),
            current,
            next_uid: AtomicUsize::new(1),
            reject_delete: AtomicBool::new(false),
            fail_secondary_sign_out: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            secondary_sign_outs: AtomicUsize::new(0),
        }))
    }

    pub fn state(&self) -> &ProviderState {
        &self.0
    }

    pub fn seed_account(&self, uid: &str, email: &str, password: &str) {
        self.0.accounts.lock().expect("accounts lock").insert(
            email.to_string(),
            FakeAccount {
                uid: uid.into(),
                password: password.to_string(),
            },
        );
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.0
            .accounts
            .lock()
            .expect("accounts lock")
            .contains_key(email)
    }

    pub fn account_uid(&self, email: &str) -> Option<Uid> {
        self.0
            .accounts
            .lock()
            .expect("accounts lock")
            .get(email)
            .map(|account| account.uid.clone())
    }

    /// Sets the current session without going through `sign_in`, so tests
    /// can drive enforcement directly.
    pub fn force_sign_in(&self, uid: &str, email: &str) -> Identity {
        let identity = Identity::new(uid.into(), email).with_id_token("tok_fake");
        self.0.current.send_replace(Some(identity.clone()));
        identity
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let identity = {
            let accounts = self.0.accounts.lock().expect("accounts lock");
            let account = accounts
                .get(email)
                .filter(|account| account.password == password)
                .ok_or(ProviderError::InvalidCredentials)?;
            Identity::new(account.uid.clone(), email).with_id_token("tok_fake")
        };
        self.0.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.0.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.0.current.send_replace(None);
        Ok(())
    }

    async fn delete_account(&self, identity: &Identity) -> Result<(), ProviderError> {
        self.0.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.reject_delete.load(Ordering::SeqCst) {
            return Err(ProviderError::DeletionRejected {
                reason: "credential too old, sign in again".to_string(),
            });
        }
        let removed = {
            let mut accounts = self.0.accounts.lock().expect("accounts lock");
            let email = accounts
                .iter()
                .find(|(_, account)| &account.uid == identity.uid())
                .map(|(email, _)| email.clone());
            match email {
                Some(email) => {
                    accounts.remove(&email);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Err(ProviderError::DeletionRejected {
                reason: "account not found".to_string(),
            });
        }
        let current_matches = self
            .0
            .current
            .borrow()
            .as_ref()
            .is_some_and(|current| current.uid() == identity.uid());
        if current_matches {
            self.0.current.send_replace(None);
        }
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.0.current.borrow().clone()
    }

    fn session_changes(&self) -> SessionChanges {
        self.0.current.subscribe()
    }

    fn secondary(&self) -> Box<dyn SecondarySession> {
        Box::new(FakeSecondary {
            state: Arc::clone(&self.0),
            session: Mutex::new(None),
        })
    }
}

/// Fake isolated secondary session.
pub(crate) struct FakeSecondary {
    state: Arc<ProviderState>,
    session: Mutex<Option<Identity>>,
}

#[async_trait]
impl SecondarySession for FakeSecondary {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let mut accounts = self.state.accounts.lock().expect("accounts lock");
        if accounts.contains_key(email) {
            return Err(ProviderError::EmailInUse {
                email: email.to_string(),
            });
        }
        let uid: Uid = format!("u{}", self.state.next_uid.fetch_add(1, Ordering::SeqCst) + 100)
            .as_str()
            .into();
        accounts.insert(
            email.to_string(),
            FakeAccount {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        let identity = Identity::new(uid, email).with_id_token("tok_secondary");
        *self.session.lock().expect("session lock") = Some(identity.clone());
        // The primary session's watch channel is deliberately untouched.
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.state.secondary_sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_secondary_sign_out.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable {
                reason: "secondary session revoke failed".to_string(),
            });
        }
        *self.session.lock().expect("session lock") = None;
        Ok(())
    }
}

/// Fake admin directory store.
pub(crate) struct FakeDirectory {
    records: Mutex<HashMap<Uid, AdminRecord>>,
    /// Forces every operation to report `Unavailable`.
    pub unavailable: AtomicBool,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, uid: &str, email: &str) {
        let uid: Uid = uid.into();
        self.records.lock().expect("records lock").insert(
            uid.clone(),
            AdminRecord::new(uid, email, None, Utc::now(), None),
        );
    }

    pub fn remove(&self, uid: &str) {
        self.records
            .lock()
            .expect("records lock")
            .remove(&Uid::from(uid));
    }

    pub fn contains(&self, uid: &Uid) -> bool {
        self.records.lock().expect("records lock").contains_key(uid)
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable {
                reason: "injected outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AdminDirectory for FakeDirectory {
    async fn get(&self, uid: &Uid) -> Result<Option<AdminRecord>, DirectoryError> {
        self.check_available()?;
        Ok(self.records.lock().expect("records lock").get(uid).cloned())
    }

    async fn list(&self) -> Result<Vec<AdminRecord>, DirectoryError> {
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .expect("records lock")
            .values()
            .cloned()
            .collect())
    }

    async fn put(&self, uid: &Uid, draft: &AdminRecordDraft) -> Result<(), DirectoryError> {
        self.check_available()?;
        let record = AdminRecord::new(
            uid.clone(),
            draft.email.clone(),
            draft.display_name.clone(),
            // Server-assigned timestamp.
            Utc::now(),
            draft.created_by.clone(),
        );
        self.records
            .lock()
            .expect("records lock")
            .insert(uid.clone(), record);
        Ok(())
    }

    async fn delete(&self, uid: &Uid) -> Result<(), DirectoryError> {
        self.check_available()?;
        self.records.lock().expect("records lock").remove(uid);
        Ok(())
    }
}
