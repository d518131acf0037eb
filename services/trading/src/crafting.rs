//! Scenario crafting pipeline
//!
//! One-shot background job that turns a freshly-created session into a
//! playable one: finalize the category selection, pick instruments, request
//! the five-week scenario, persist each week, and flip the session out of
//! `Starting`. Any failure drives the session to a terminal `Expired` —
//! crafting never leaves a session stuck.

use crate::catalog::{Catalog, CATEGORIES_PER_SESSION};
use crate::scenario::ScenarioGenerator;
use crate::store::DurableStore;
use crate::week_data::WeekDataStore;
use dashmap::DashSet;
use std::sync::Arc;
use types::errors::{GameError, GameResult};
use types::token::SessionToken;

/// Player-facing filter names that are not real catalog categories
const PSEUDO_CATEGORIES: [&str; 2] = ["Trending", "Recent"];

pub struct CraftingPipeline {
    durable: Arc<dyn DurableStore>,
    catalog: Arc<dyn Catalog>,
    generator: Arc<dyn ScenarioGenerator>,
    week_data: WeekDataStore,
    in_flight: DashSet<SessionToken>,
}

impl CraftingPipeline {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        catalog: Arc<dyn Catalog>,
        generator: Arc<dyn ScenarioGenerator>,
        week_data: WeekDataStore,
    ) -> Self {
        Self {
            durable,
            catalog,
            generator,
            week_data,
            in_flight: DashSet::new(),
        }
    }

    /// Run the pipeline for one session
    ///
    /// Exactly-once per session: a duplicate dispatch while the first run is
    /// in flight is dropped, and the `Starting`-scoped status flip rejects a
    /// rerun after completion.
    pub async fn run(&self, session_id: SessionToken, requested: Vec<String>) {
        if !self.in_flight.insert(session_id.clone()) {
            tracing::warn!(session = %session_id, "crafting already in flight, dropping duplicate dispatch");
            return;
        }

        let result = self.craft(&session_id, requested).await;
        let success = result.is_ok();
        if let Err(err) = &result {
            tracing::error!(session = %session_id, %err, "crafting failed, expiring session");
        }

        if let Err(err) = self.durable.complete_crafting(&session_id, success).await {
            tracing::error!(session = %session_id, %err, "failed to resolve crafting status");
        } else if success {
            tracing::info!(session = %session_id, "crafting complete, session open for week 1");
        }

        self.in_flight.remove(&session_id);
    }

    async fn craft(&self, session_id: &SessionToken, requested: Vec<String>) -> GameResult<()> {
        let categories = self.resolve_categories(requested).await?;
        let instruments = self.catalog.pick_instruments(&categories).await?;
        let weeks = self.generator.generate(&categories, &instruments).await?;
        self.week_data.put_scenario(session_id, &weeks).await
    }

    /// Finalize the category selection
    ///
    /// Drops pseudo-categories, deduplicates preserving request order, keeps
    /// only catalog-known names, and backfills in catalog order until exactly
    /// three are chosen.
    async fn resolve_categories(&self, requested: Vec<String>) -> GameResult<Vec<String>> {
        let known: Vec<String> = self
            .catalog
            .find_all_categories()
            .await?
            .into_iter()
            .map(|category| category.name)
            .collect();

        let mut chosen: Vec<String> = Vec::with_capacity(CATEGORIES_PER_SESSION);
        for name in requested {
            if chosen.len() == CATEGORIES_PER_SESSION {
                break;
            }
            if PSEUDO_CATEGORIES
                .iter()
                .any(|pseudo| pseudo.eq_ignore_ascii_case(&name))
            {
                continue;
            }
            // Resolve to the catalog's canonical spelling
            let Some(canonical) = known
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(&name))
            else {
                continue;
            };
            if !chosen.contains(canonical) {
                chosen.push(canonical.clone());
            }
        }

        for candidate in &known {
            if chosen.len() == CATEGORIES_PER_SESSION {
                break;
            }
            if !chosen.contains(candidate) {
                chosen.push(candidate.clone());
            }
        }

        if chosen.len() != CATEGORIES_PER_SESSION {
            return Err(GameError::Internal(format!(
                "unable to assemble {CATEGORIES_PER_SESSION} categories from the catalog"
            )));
        }
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::memory::{MemorySessionStore, MemoryVolatileStore};
    use crate::scenario::ScriptedGenerator;
    use crate::store::VolatileStore;
    use async_trait::async_trait;
    use types::catalog::Instrument;
    use types::session::Session;
    use types::status::SessionStatus;

    struct FailingGenerator;

    #[async_trait]
    impl ScenarioGenerator for FailingGenerator {
        async fn generate(
            &self,
            _categories: &[String],
            _instruments: &[Instrument],
        ) -> GameResult<crate::scenario::ScenarioWeeks> {
            Err(GameError::Internal("generator offline".into()))
        }
    }

    fn pipeline_with(
        durable: Arc<MemorySessionStore>,
        volatile: Arc<MemoryVolatileStore>,
        generator: Arc<dyn ScenarioGenerator>,
    ) -> CraftingPipeline {
        CraftingPipeline::new(
            durable,
            Arc::new(MemoryCatalog::seeded()),
            generator,
            WeekDataStore::new(volatile as Arc<dyn VolatileStore>),
        )
    }

    #[tokio::test]
    async fn test_successful_craft_opens_week1() {
        let durable = Arc::new(MemorySessionStore::new());
        let volatile = Arc::new(MemoryVolatileStore::new());
        let session = Session::new("alice");
        durable.insert(&session).await.unwrap();

        let pipeline = pipeline_with(
            Arc::clone(&durable),
            Arc::clone(&volatile),
            Arc::new(ScriptedGenerator),
        );
        pipeline
            .run(
                session.session_id.clone(),
                vec!["Tech".into(), "Health".into(), "Energy".into()],
            )
            .await;

        let stored = durable.find(&session.session_id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Week1);

        let week_store = WeekDataStore::new(volatile as Arc<dyn VolatileStore>);
        for week in 1..=5 {
            assert!(week_store.get(&session.session_id, week).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_failed_generation_expires_session() {
        let durable = Arc::new(MemorySessionStore::new());
        let volatile = Arc::new(MemoryVolatileStore::new());
        let session = Session::new("bob");
        durable.insert(&session).await.unwrap();

        let pipeline = pipeline_with(
            Arc::clone(&durable),
            volatile,
            Arc::new(FailingGenerator),
        );
        pipeline
            .run(
                session.session_id.clone(),
                vec!["Tech".into(), "Health".into(), "Energy".into()],
            )
            .await;

        let stored = durable.find(&session.session_id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Expired);
    }

    #[tokio::test]
    async fn test_resolve_filters_pseudo_and_backfills() {
        let durable = Arc::new(MemorySessionStore::new());
        let volatile = Arc::new(MemoryVolatileStore::new());
        let pipeline = pipeline_with(durable, volatile, Arc::new(ScriptedGenerator));

        // Pseudo-category and duplicate dropped, unknown dropped, backfilled
        // from catalog order (Tech, Health, Energy, ...)
        let resolved = pipeline
            .resolve_categories(vec![
                "Trending".into(),
                "energy".into(),
                "Energy".into(),
                "Crypto".into(),
            ])
            .await
            .unwrap();

        assert_eq!(resolved, vec!["Energy", "Tech", "Health"]);
    }

    #[tokio::test]
    async fn test_resolve_caps_at_three() {
        let durable = Arc::new(MemorySessionStore::new());
        let volatile = Arc::new(MemoryVolatileStore::new());
        let pipeline = pipeline_with(durable, volatile, Arc::new(ScriptedGenerator));

        let resolved = pipeline
            .resolve_categories(vec![
                "Retail".into(),
                "Finance".into(),
                "Tech".into(),
                "Health".into(),
            ])
            .await
            .unwrap();

        assert_eq!(resolved, vec!["Retail", "Finance", "Tech"]);
    }
}
