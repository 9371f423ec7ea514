//! Shared application state for the API routes.

use crate::error::ApiError;
use quizpress_access::{AuthCoordinator, RosterManager};
use quizpress_catalog::QuizRepository;
use std::sync::Arc;

/// State handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<AuthCoordinator>,
    pub roster: Arc<RosterManager>,
    pub quizzes: Arc<QuizRepository>,
}

impl AppState {
    /// Rejects the request unless an authorized administrator is signed in.
    ///
    /// # Errors
    ///
    /// `ApiError::NotAuthenticated` when nobody is signed in, or when the
    /// session survived but its admin record is gone (the coordinator will
    /// destroy it on its next enforcement cycle).
    pub fn require_admin(&self) -> Result<(), ApiError> {
        let session = self.coordinator.snapshot();
        if session.current.is_some() && session.is_admin {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }
}
