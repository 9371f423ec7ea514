//! Admin access and the authorization lifecycle for quizpress.
//!
//! This crate provides:
//! - The identity-provider and admin-directory contracts the application
//!   consumes (`IdentityProvider`, `SecondarySession`, `AdminDirectory`)
//! - Reactive session state (`SessionState`, `AuthPhase`)
//! - The authorization coordinator (`AuthCoordinator`), which enforces that a
//!   signed-in identity stays valid only while a matching admin record exists
//! - Roster management (`RosterManager`) for adding and removing admins
//!
//! # Authorization Model
//!
//! Authorization is presence-based: an identity is an administrator exactly
//! while a record keyed by its uid exists in the admin directory. The
//! coordinator re-checks that presence on every sign-in and on every
//! session-change notification, and destroys the identity itself when the
//! record has been removed. Removing an admin from the roster therefore
//! revokes access the next time that admin's session surfaces anywhere.

pub mod admin;
pub mod coordinator;
pub mod error;
pub mod identity;
pub mod roster;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types at crate root
pub use admin::{AdminDirectory, AdminRecord, AdminRecordDraft};
pub use coordinator::{AuthCoordinator, ListenerGuard};
pub use error::{DirectoryError, EnforcementError, LoginError, ProviderError, RosterError};
pub use identity::{Identity, IdentityProvider, SecondarySession, SessionChanges};
pub use roster::RosterManager;
pub use session::{AuthPhase, SessionState};
