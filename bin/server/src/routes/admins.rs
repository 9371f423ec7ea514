//! Admin roster routes. All of them require an authorized administrator.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use quizpress_access::AdminRecord;
use quizpress_core::Uid;
use serde::{Deserialize, Serialize};

/// Client-facing projection of an admin record.
#[derive(Debug, Serialize)]
pub struct AdminView {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AdminRecord> for AdminView {
    fn from(record: AdminRecord) -> Self {
        Self {
            uid: record.uid().to_string(),
            email: record.email().to_string(),
            display_name: record.display_name().map(str::to_string),
            created_at: record.created_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddAdminRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// `GET /api/admins`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AdminView>>, ApiError> {
    state.require_admin()?;
    let records = state.roster.list().await?;
    Ok(Json(records.into_iter().map(AdminView::from).collect()))
}

/// `POST /api/admins`
///
/// The new credential is created on an isolated secondary session, so the
/// acting administrator stays signed in throughout.
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddAdminRequest>,
) -> Result<(StatusCode, Json<AdminView>), ApiError> {
    state.require_admin()?;
    let record = state
        .roster
        .add(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `DELETE /api/admins/{uid}`
///
/// Removes the record only. The removed admin's account is destroyed by the
/// coordinator the next time that identity signs in or surfaces.
pub async fn remove(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.require_admin()?;
    state.roster.remove(&Uid::from(uid.as_str())).await?;
    Ok(StatusCode::NO_CONTENT)
}
