use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{catalog, session, trade};
use crate::state::AppState;

/// Full API surface under `/api`
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", post(session::create_session))
        .route("/sessions/state", get(session::get_state))
        .route("/sessions/buy", post(trade::buy))
        .route("/sessions/sell", post(trade::sell))
        .route("/sessions/advance", post(session::advance_week))
        .route("/sessions/end", post(session::end_session))
        .route("/sessions/weeks/{week}", get(session::get_week_data))
        .route("/leaderboard", get(session::leaderboard))
        .route("/stocks", get(catalog::list_stocks))
        .route("/categories", get(catalog::list_categories));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
