//! Buy and sell handlers

use axum::Json;
use axum::extract::State;
use types::session::SessionState;

use crate::auth::SessionBearer;
use crate::error::AppError;
use crate::models::TradeRequest;
use crate::state::AppState;

pub async fn buy(
    State(state): State<AppState>,
    SessionBearer(token): SessionBearer,
    Json(request): Json<TradeRequest>,
) -> Result<Json<SessionState>, AppError> {
    state.trade_limiter.check(&token)?;
    let result = state
        .trading
        .buy(&token, &request.ticker, request.quantity)
        .await?;
    Ok(Json(result))
}

pub async fn sell(
    State(state): State<AppState>,
    SessionBearer(token): SessionBearer,
    Json(request): Json<TradeRequest>,
) -> Result<Json<SessionState>, AppError> {
    state.trade_limiter.check(&token)?;
    let result = state
        .trading
        .sell(&token, &request.ticker, request.quantity)
        .await?;
    Ok(Json(result))
}
