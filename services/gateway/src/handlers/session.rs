//! Session lifecycle handlers

use axum::Json;
use axum::extract::{Path, State};
use types::errors::GameError;
use types::session::{Session, SessionState};
use types::week::WeekData;

use crate::auth::SessionBearer;
use crate::error::AppError;
use crate::models::{CreateSessionRequest, CreateSessionResponse};
use crate::state::AppState;

/// Number of categories a player must pick
const REQUIRED_CATEGORIES: usize = 3;

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(GameError::InvalidInput("username must not be empty".to_string()).into());
    }
    if request.categories.len() != REQUIRED_CATEGORIES {
        return Err(GameError::InvalidInput(format!(
            "exactly {REQUIRED_CATEGORIES} categories required, got {}",
            request.categories.len()
        ))
        .into());
    }
    if request.categories.iter().any(|c| c.trim().is_empty()) {
        return Err(GameError::InvalidInput("category names must not be empty".to_string()).into());
    }

    let session_id = state.trading.create(username, request.categories).await?;
    Ok(Json(CreateSessionResponse { session_id }))
}

pub async fn get_state(
    State(state): State<AppState>,
    SessionBearer(token): SessionBearer,
) -> Result<Json<SessionState>, AppError> {
    Ok(Json(state.trading.get_state(&token).await?))
}

pub async fn advance_week(
    State(state): State<AppState>,
    SessionBearer(token): SessionBearer,
) -> Result<Json<SessionState>, AppError> {
    Ok(Json(state.trading.advance_week(&token).await?))
}

pub async fn end_session(
    State(state): State<AppState>,
    SessionBearer(token): SessionBearer,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.trading.end_session(&token).await?))
}

pub async fn get_week_data(
    State(state): State<AppState>,
    SessionBearer(token): SessionBearer,
    Path(week): Path<u8>,
) -> Result<Json<WeekData>, AppError> {
    Ok(Json(state.trading.get_week_data(&token, week).await?))
}

pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<Session>>, AppError> {
    Ok(Json(state.trading.get_leaderboard().await?))
}
