//! Hosted-backend clients for quizpress.
//!
//! The application owns no storage engine and no account database; both are
//! delegated to a hosted backend. This crate provides the two REST clients
//! that implement the contracts from `quizpress-access` and
//! `quizpress-catalog`:
//!
//! - [`IdentityClient`]: email/password accounts against an identity-toolkit
//!   style API (sign-in, sign-up, hard delete), plus the process-local
//!   session-change stream and the isolated secondary session used when
//!   creating new admin credentials.
//! - [`DocumentClient`]: typed document CRUD against a Firestore-style API,
//!   backing both the admin directory and the quiz collection, with
//!   server-assigned creation timestamps.

pub mod config;
pub mod error;
mod http;
pub mod identity;
pub mod store;

pub use config::BackendConfig;
pub use error::BackendError;
pub use identity::{IdentityClient, TokenSource};
pub use store::DocumentClient;
