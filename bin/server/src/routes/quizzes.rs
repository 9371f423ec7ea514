//! Quiz catalog routes.
//!
//! Reads are public; every mutation requires an authorized administrator.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use quizpress_catalog::{Quiz, QuizDraft};
use quizpress_core::QuizId;

fn parse_id(raw: &str) -> Result<QuizId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound {
        message: format!("quiz '{raw}' not found"),
    })
}

/// `GET /api/quizzes`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Quiz>>, ApiError> {
    Ok(Json(state.quizzes.list().await?))
}

/// `GET /api/quizzes/{id}`
pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.quizzes.get(&id).await?))
}

/// `POST /api/quizzes`
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<QuizDraft>,
) -> Result<(StatusCode, Json<Quiz>), ApiError> {
    state.require_admin()?;
    let quiz = state.quizzes.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// `PUT /api/quizzes/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<QuizDraft>,
) -> Result<Json<Quiz>, ApiError> {
    state.require_admin()?;
    let id = parse_id(&id)?;
    Ok(Json(state.quizzes.update(&id, &draft).await?))
}

/// `DELETE /api/quizzes/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.require_admin()?;
    let id = parse_id(&id)?;
    state.quizzes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
