//! Reactive session state published by the authorization coordinator.
//!
//! There is exactly one live `SessionState` per process. It is owned and
//! written by the coordinator alone; consumers hold read-only watch
//! projections of it. It is never persisted and is rebuilt from the identity
//! provider's notifications on every process start.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// The coordinator's view of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// The identity provider's current principal, if any.
    pub current: Option<Identity>,
    /// True only after an enforcement check confirmed a matching admin record.
    pub is_admin: bool,
    /// True when the last cycle ended in destroying the session's own
    /// identity (or signing it out after a rejected deletion) because no
    /// admin record existed. Lets the UI explain why access vanished.
    pub just_removed: bool,
    /// True from process start until the first enforcement cycle completes,
    /// including the "no identity at all" case.
    pub loading: bool,
}

impl SessionState {
    /// The state at process start.
    #[must_use]
    pub fn initializing() -> Self {
        Self {
            current: None,
            is_admin: false,
            just_removed: false,
            loading: true,
        }
    }

    /// Returns which lifecycle phase this state is in.
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        if self.loading {
            AuthPhase::Initializing
        } else {
            match (&self.current, self.is_admin) {
                (None, _) => AuthPhase::Unauthenticated,
                (Some(_), false) => AuthPhase::Authenticated,
                (Some(_), true) => AuthPhase::AuthenticatedAdmin,
            }
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initializing()
    }
}

/// Lifecycle phase of the session state machine.
///
/// `Authenticated` is transient: a live identity that has not yet passed the
/// admin check for this cycle. Enforcement always moves it to either
/// `AuthenticatedAdmin` or `Unauthenticated` before the state is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Initializing,
    Unauthenticated,
    Authenticated,
    AuthenticatedAdmin,
}
