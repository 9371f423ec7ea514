//! Session routes: current state, login, logout.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use quizpress_access::SessionState;
use serde::{Deserialize, Serialize};

/// Client-facing projection of the session state.
///
/// The ID token never leaves the server; only the phase and the identity's
/// public fields do.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub email: Option<String>,
    pub uid: Option<String>,
    pub is_admin: bool,
    /// True when the last enforcement cycle revoked this session's access.
    /// The dashboard uses it to explain the sign-out.
    pub just_removed: bool,
    pub loading: bool,
}

impl From<SessionState> for SessionView {
    fn from(state: SessionState) -> Self {
        Self {
            email: state
                .current
                .as_ref()
                .map(|identity| identity.email().to_string()),
            uid: state
                .current
                .as_ref()
                .map(|identity| identity.uid().to_string()),
            is_admin: state.is_admin,
            just_removed: state.just_removed,
            loading: state.loading,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `GET /api/session`
pub async fn current(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.coordinator.snapshot().into())
}

/// `POST /api/login`
///
/// A valid password for an identity whose admin record is gone is not a
/// credential failure: enforcement destroys the identity and the caller gets
/// a 403 explaining the revocation.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let identity = state
        .coordinator
        .login(&request.email, &request.password)
        .await?;

    match identity {
        Some(_) => Ok(Json(state.coordinator.snapshot().into())),
        None => Err(ApiError::AccessRevoked),
    }
}

/// `POST /api/logout`
pub async fn logout(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    state.coordinator.logout().await?;
    Ok(Json(state.coordinator.snapshot().into()))
}
