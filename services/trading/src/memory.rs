//! In-memory store implementations
//!
//! Back the test suites and the development server. The durable store keeps
//! one `tokio::sync::Mutex` per session row; `begin` takes the owned guard,
//! which gives the same serialization the relational row lock provides in
//! production: trades on one session queue up, different sessions run in
//! parallel.

use crate::store::{DurableStore, DurableTx, VolatileStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use types::errors::{GameError, GameResult};
use types::session::Session;
use types::status::SessionStatus;
use types::token::SessionToken;

/// TTL key-value store over a concurrent map
///
/// Expiry is lazy: an expired entry is evicted by the read that observes it.
#[derive(Default)]
pub struct MemoryVolatileStore {
    entries: DashMap<String, (Vec<u8>, Instant)>,
}

impl MemoryVolatileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a key's remaining TTL, as if the window had elapsed (test hook)
    pub fn expire_now(&self, key: &str) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.value_mut().1 = Instant::now();
        }
    }
}

#[async_trait]
impl VolatileStore for MemoryVolatileStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> GameResult<()> {
        self.entries
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> GameResult<Option<Vec<u8>>> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.value().1 > Instant::now() {
                    return Ok(Some(entry.value().0.clone()));
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> GameResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Durable session store over a concurrent map of row locks
#[derive(Default)]
pub struct MemorySessionStore {
    rows: DashMap<String, Arc<Mutex<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn row(&self, id: &SessionToken) -> GameResult<Arc<Mutex<Session>>> {
        self.rows
            .get(id.as_str())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GameError::NotFound(format!("session {id} not found")))
    }
}

#[async_trait]
impl DurableStore for MemorySessionStore {
    async fn insert(&self, session: &Session) -> GameResult<()> {
        let key = session.session_id.as_str().to_string();
        if self.rows.contains_key(&key) {
            return Err(GameError::Internal(format!(
                "duplicate session id {}",
                session.session_id
            )));
        }
        self.rows
            .insert(key, Arc::new(Mutex::new(session.clone())));
        Ok(())
    }

    async fn find(&self, id: &SessionToken) -> GameResult<Session> {
        let row = self.row(id)?;
        let session = row.lock().await.clone();
        Ok(session)
    }

    async fn set_status(&self, id: &SessionToken, status: SessionStatus) -> GameResult<()> {
        let row = self.row(id)?;
        let mut session = row.lock().await;
        // Terminal statuses are final; a racing expiry demotion must not
        // overwrite them
        if session.status.is_finished() {
            return Ok(());
        }
        session.status = status;
        session.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn complete_crafting(&self, id: &SessionToken, success: bool) -> GameResult<()> {
        let row = self.row(id)?;
        let mut session = row.lock().await;
        if session.status != SessionStatus::Starting {
            return Err(GameError::NotFound(format!(
                "session {id} not in starting status"
            )));
        }
        session.status = if success {
            SessionStatus::Week1
        } else {
            SessionStatus::Expired
        };
        session.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn begin(&self, id: &SessionToken) -> GameResult<Box<dyn DurableTx>> {
        let row = self.row(id)?;
        let guard = row.lock_owned().await;
        if guard.status.is_finished() {
            return Err(GameError::NotAvailable(format!(
                "session {id} is no longer active"
            )));
        }
        let staged = guard.clone();
        Ok(Box::new(MemoryDurableTx { guard, staged }))
    }

    async fn leaderboard(&self, page: usize, page_size: usize) -> GameResult<Vec<Session>> {
        let rows: Vec<Arc<Mutex<Session>>> = self
            .rows
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut finished = Vec::new();
        for row in rows {
            let session = row.lock().await;
            if session.status == SessionStatus::Finished {
                finished.push(session.clone());
            }
        }

        // Cash descending; equal balances rank the earlier-created session
        // first (map iteration order is arbitrary, so ties need an explicit
        // tiebreak)
        finished.sort_by(|a, b| b.cash.cmp(&a.cash).then(a.created_at.cmp(&b.created_at)));

        let offset = page.saturating_sub(1) * page_size;
        Ok(finished.into_iter().skip(offset).take(page_size).collect())
    }
}

/// Row-locked unit of work: holds the owned guard until commit or drop
struct MemoryDurableTx {
    guard: OwnedMutexGuard<Session>,
    staged: Session,
}

#[async_trait]
impl DurableTx for MemoryDurableTx {
    fn session(&self) -> &Session {
        &self.staged
    }

    async fn save(&mut self, session: &Session) -> GameResult<()> {
        self.staged = session.clone();
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> GameResult<()> {
        *self.guard = self.staged.clone();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> GameResult<()> {
        // Dropping the guard releases the row; staged writes are discarded
        Ok(())
    }
}
