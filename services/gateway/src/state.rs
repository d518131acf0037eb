use std::sync::Arc;
use trading::catalog::Catalog;
use trading::service::TradingService;

use crate::rate_limit::TradeLimiter;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub trading: Arc<TradingService>,
    pub catalog: Arc<dyn Catalog>,
    pub trade_limiter: Arc<TradeLimiter>,
}

impl AppState {
    pub fn new(trading: Arc<TradingService>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            trading,
            catalog,
            trade_limiter: Arc::new(TradeLimiter::for_trades()),
        }
    }
}
