mod auth;
mod error;
mod handlers;
mod models;
mod openrouter;
mod rate_limit;
mod router;
mod state;

use std::sync::Arc;
use trading::catalog::MemoryCatalog;
use trading::memory::{MemorySessionStore, MemoryVolatileStore};
use trading::scenario::{ScenarioGenerator, ScriptedGenerator};
use trading::service::TradingService;

use crate::openrouter::OpenRouterGenerator;
use crate::state::AppState;

const BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let generator: Arc<dyn ScenarioGenerator> = match OpenRouterGenerator::from_env() {
        Some(generator) => Arc::new(generator),
        None => {
            tracing::warn!("OPENROUTER_API_KEY not set, using scripted scenario generator");
            Arc::new(ScriptedGenerator)
        }
    };

    let catalog = Arc::new(MemoryCatalog::seeded());
    let trading = Arc::new(TradingService::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(MemoryVolatileStore::new()),
        catalog.clone(),
        generator,
    ));

    let app = router::build_router(AppState::new(trading, catalog));

    let listener = tokio::net::TcpListener::bind(BIND_ADDR).await?;
    tracing::info!(addr = BIND_ADDR, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
