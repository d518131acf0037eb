//! Typed access to a session's per-week market data
//!
//! Week data is written once per (session, week) by the crafting pipeline
//! and read by every trade and week-advance. It lives in the volatile store
//! under the same TTL window as the holdings ledger.

use crate::store::{VolatileStore, VOLATILE_TTL};
use std::collections::HashMap;
use std::sync::Arc;
use types::errors::{GameError, GameResult};
use types::token::SessionToken;
use types::week::{is_valid_week, WeekData, WEEKS_PER_SESSION};

fn week_key(id: &SessionToken, week: u8) -> String {
    format!("gm:session:{id}:week:{week}")
}

/// Read-only-after-craft accessor for week data
#[derive(Clone)]
pub struct WeekDataStore {
    volatile: Arc<dyn VolatileStore>,
}

impl WeekDataStore {
    pub fn new(volatile: Arc<dyn VolatileStore>) -> Self {
        Self { volatile }
    }

    /// Fetch one week's data
    ///
    /// `InvalidInput` outside 1..=5; `NotFound` when absent (crafting not
    /// finished, or the cache window elapsed).
    pub async fn get(&self, id: &SessionToken, week: u8) -> GameResult<WeekData> {
        if !is_valid_week(week) {
            return Err(GameError::InvalidInput(format!(
                "invalid week number {week}: must be between 1 and 5"
            )));
        }

        let raw = self
            .volatile
            .get(&week_key(id, week))
            .await?
            .ok_or_else(|| {
                GameError::NotFound(format!("no week {week} data for session {id}"))
            })?;

        Ok(serde_json::from_slice(&raw)?)
    }

    /// Idempotent overwrite of one week's data
    pub async fn put(&self, id: &SessionToken, week: u8, data: &WeekData) -> GameResult<()> {
        if !is_valid_week(week) {
            return Err(GameError::InvalidInput(format!(
                "invalid week number {week}: must be between 1 and 5"
            )));
        }
        let raw = serde_json::to_vec(data)?;
        self.volatile.set(&week_key(id, week), raw, VOLATILE_TTL).await
    }

    /// Persist a full five-week scenario
    ///
    /// Fails `InvalidInput` if any week is missing from the generated map.
    pub async fn put_scenario(
        &self,
        id: &SessionToken,
        weeks: &HashMap<u8, WeekData>,
    ) -> GameResult<()> {
        for week in 1..=WEEKS_PER_SESSION {
            let data = weeks.get(&week).ok_or_else(|| {
                GameError::InvalidInput(format!("missing data for week{week}"))
            })?;
            self.put(id, week, data).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVolatileStore;

    fn store() -> WeekDataStore {
        WeekDataStore::new(Arc::new(MemoryVolatileStore::new()))
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = store();
        let id = SessionToken::generate();
        let data = WeekData {
            headlines: vec!["Tech rallies".to_string()],
            quotes: vec![],
        };

        store.put(&id, 1, &data).await.unwrap();
        assert_eq!(store.get(&id, 1).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_week_bounds_rejected() {
        let store = store();
        let id = SessionToken::generate();
        assert!(matches!(
            store.get(&id, 0).await,
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            store.get(&id, 6).await,
            Err(GameError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_week_is_not_found() {
        let store = store();
        let id = SessionToken::generate();
        assert!(matches!(
            store.get(&id, 3).await,
            Err(GameError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_put_scenario_requires_all_weeks() {
        let store = store();
        let id = SessionToken::generate();
        let mut weeks = HashMap::new();
        for week in 1..=4u8 {
            weeks.insert(week, WeekData::default());
        }

        assert!(matches!(
            store.put_scenario(&id, &weeks).await,
            Err(GameError::InvalidInput(_))
        ));

        weeks.insert(5, WeekData::default());
        store.put_scenario(&id, &weeks).await.unwrap();
        assert!(store.get(&id, 5).await.is_ok());
    }
}
