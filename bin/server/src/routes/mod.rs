//! API route handlers.

pub mod admins;
pub mod quizzes;
pub mod session;

use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/session", get(session::current))
        .route("/api/login", post(session::login))
        .route("/api/logout", post(session::logout))
        .route("/api/quizzes", get(quizzes::list).post(quizzes::create))
        .route(
            "/api/quizzes/{id}",
            get(quizzes::fetch)
                .put(quizzes::update)
                .delete(quizzes::remove),
        )
        .route("/api/admins", get(admins::list).post(admins::add))
        .route("/api/admins/{uid}", delete(admins::remove))
        .with_state(state)
}
