//! Wire models for the HTTP boundary

use serde::{Deserialize, Serialize};
use types::token::SessionToken;

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub username: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: SessionToken,
}

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub ticker: String,
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}
