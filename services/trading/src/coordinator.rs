//! Transaction coordinator
//!
//! Every trading operation runs inside a `TradeTx`: an isolated, serialized
//! read-modify-write unit of work spanning the durable session row and the
//! volatile holdings ledger. The durable row lock taken at `begin` is the
//! sole serialization point for a session; the volatile store is written only
//! while that lock is held.
//!
//! The volatile write in `update` is applied eagerly, outside the durable
//! commit's atomicity boundary: a rollback after `update` cannot undo it.
//! This keeps the cache ordering of the original protocol; the window is
//! bounded by the ledger TTL.

use crate::store::{DurableStore, DurableTx, VolatileStore, VOLATILE_TTL};
use std::sync::Arc;
use types::errors::{GameError, GameResult};
use types::ledger::HoldingsLedger;
use types::session::Session;
use types::status::SessionStatus;
use types::token::SessionToken;

fn ledger_key(id: &SessionToken) -> String {
    format!("session:{id}:metadata")
}

/// Owns the dual-store read-modify-write protocol
#[derive(Clone)]
pub struct TransactionCoordinator {
    durable: Arc<dyn DurableStore>,
    volatile: Arc<dyn VolatileStore>,
}

impl TransactionCoordinator {
    pub fn new(durable: Arc<dyn DurableStore>, volatile: Arc<dyn VolatileStore>) -> Self {
        Self { durable, volatile }
    }

    /// Open a unit of work on one session
    ///
    /// Acquires the row-exclusive lock, then fetches the ledger. A missing
    /// ledger (TTL elapsed or crafting never completed) demotes the session
    /// to `Expired` as a side effect and fails `NotAvailable`.
    pub async fn begin(&self, id: &SessionToken) -> GameResult<TradeTx> {
        let durable_tx = self.durable.begin(id).await?;

        let raw = self.volatile.get(&ledger_key(id)).await?;
        let Some(raw) = raw else {
            // Release the row lock before the status write; the demotion is
            // best-effort and must not mask the expiry error.
            drop(durable_tx);
            if let Err(err) = self.durable.set_status(id, SessionStatus::Expired).await {
                tracing::error!(session = %id, %err, "failed to mark session expired");
            }
            return Err(GameError::NotAvailable(format!("session {id} has expired")));
        };

        let ledger: HoldingsLedger = serde_json::from_slice(&raw)?;
        let session = durable_tx.session().clone();

        Ok(TradeTx {
            durable_tx: Some(durable_tx),
            volatile: Arc::clone(&self.volatile),
            key: ledger_key(id),
            session,
            ledger,
        })
    }

    /// Read a session's ledger outside a transaction; `None` on expiry
    pub async fn read_ledger(&self, id: &SessionToken) -> GameResult<Option<HoldingsLedger>> {
        match self.volatile.get(&ledger_key(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Write a session's ledger with a fresh TTL (session creation)
    pub async fn write_ledger(
        &self,
        id: &SessionToken,
        ledger: &HoldingsLedger,
    ) -> GameResult<()> {
        let raw = serde_json::to_vec(ledger)?;
        self.volatile.set(&ledger_key(id), raw, VOLATILE_TTL).await
    }

    /// Demote a session to `Expired` (observed ledger loss)
    pub async fn expire(&self, id: &SessionToken) -> GameResult<()> {
        self.durable.set_status(id, SessionStatus::Expired).await
    }
}

/// An open, row-locked trading transaction
///
/// Callers mutate the session and ledger in place, then `update` and
/// `commit`. Dropping the transaction without committing rolls the durable
/// unit of work back and releases the lock, so early `?` returns are safe.
pub struct TradeTx {
    durable_tx: Option<Box<dyn DurableTx>>,
    volatile: Arc<dyn VolatileStore>,
    key: String,
    session: Session,
    ledger: HoldingsLedger,
}

impl std::fmt::Debug for TradeTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeTx")
            .field("key", &self.key)
            .field("session", &self.session)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl TradeTx {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn ledger(&self) -> &HoldingsLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut HoldingsLedger {
        &mut self.ledger
    }

    /// Persist the current session and ledger state
    ///
    /// Stages the durable row for the commit. The volatile ledger is
    /// refreshed with a renewed TTL while the session stays active; a
    /// terminal session has its ledger deleted instead.
    pub async fn update(&mut self) -> GameResult<()> {
        let durable_tx = self
            .durable_tx
            .as_mut()
            .ok_or_else(|| GameError::Internal("transaction already finalized".into()))?;
        durable_tx.save(&self.session).await?;

        if self.session.status.is_finished() {
            self.volatile.delete(&self.key).await?;
        } else {
            let raw = serde_json::to_vec(&self.ledger)?;
            self.volatile.set(&self.key, raw, VOLATILE_TTL).await?;
        }
        Ok(())
    }

    /// Finalize the durable unit of work
    pub async fn commit(mut self) -> GameResult<()> {
        let durable_tx = self
            .durable_tx
            .take()
            .ok_or_else(|| GameError::Internal("transaction already finalized".into()))?;
        durable_tx.commit().await
    }

    /// Abort the durable unit of work explicitly (drop does the same)
    pub async fn rollback(mut self) -> GameResult<()> {
        match self.durable_tx.take() {
            Some(durable_tx) => durable_tx.rollback().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySessionStore, MemoryVolatileStore};
    use rust_decimal::Decimal;

    struct Fixture {
        durable: Arc<MemorySessionStore>,
        volatile: Arc<MemoryVolatileStore>,
        coordinator: TransactionCoordinator,
    }

    fn fixture() -> Fixture {
        let durable = Arc::new(MemorySessionStore::new());
        let volatile = Arc::new(MemoryVolatileStore::new());
        let coordinator = TransactionCoordinator::new(
            Arc::clone(&durable) as Arc<dyn DurableStore>,
            Arc::clone(&volatile) as Arc<dyn VolatileStore>,
        );
        Fixture {
            durable,
            volatile,
            coordinator,
        }
    }

    async fn active_session(fx: &Fixture) -> SessionToken {
        let mut session = Session::new("alice");
        session.status = SessionStatus::Week1;
        fx.durable.insert(&session).await.unwrap();
        fx.coordinator
            .write_ledger(&session.session_id, &HoldingsLedger::new())
            .await
            .unwrap();
        session.session_id
    }

    #[tokio::test]
    async fn test_begin_update_commit() {
        let fx = fixture();
        let id = active_session(&fx).await;

        let mut tx = fx.coordinator.begin(&id).await.unwrap();
        tx.session_mut().cash = Decimal::new(8_500_00, 2);
        tx.ledger_mut()
            .apply_buy("AAPL", 10, Decimal::new(150_00, 2))
            .unwrap();
        tx.update().await.unwrap();
        tx.commit().await.unwrap();

        let stored = fx.durable.find(&id).await.unwrap();
        assert_eq!(stored.cash, Decimal::new(8_500_00, 2));

        let ledger = fx.coordinator.read_ledger(&id).await.unwrap().unwrap();
        assert_eq!(ledger.get("AAPL").unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_durable_write() {
        let fx = fixture();
        let id = active_session(&fx).await;

        {
            let mut tx = fx.coordinator.begin(&id).await.unwrap();
            tx.session_mut().cash = Decimal::ZERO;
            tx.update().await.unwrap();
            // dropped here: durable write discarded
        }

        let stored = fx.durable.find(&id).await.unwrap();
        assert_eq!(stored.cash, types::session::starting_cash());
    }

    #[tokio::test]
    async fn test_missing_ledger_expires_session() {
        let fx = fixture();
        let id = active_session(&fx).await;
        fx.volatile.expire_now(&format!("session:{id}:metadata"));

        let err = fx.coordinator.begin(&id).await.unwrap_err();
        assert!(matches!(err, GameError::NotAvailable(_)));

        let stored = fx.durable.find(&id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Expired);
    }

    #[tokio::test]
    async fn test_terminal_update_deletes_ledger() {
        let fx = fixture();
        let id = active_session(&fx).await;

        let mut tx = fx.coordinator.begin(&id).await.unwrap();
        tx.session_mut().status = SessionStatus::Finished;
        tx.update().await.unwrap();
        tx.commit().await.unwrap();

        assert!(fx.coordinator.read_ledger(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_transactions_serialize() {
        let fx = fixture();
        let id = active_session(&fx).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let coordinator = fx.coordinator.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let mut tx = coordinator.begin(&id).await.unwrap();
                let cash = tx.session().cash - Decimal::ONE;
                tx.session_mut().cash = cash;
                tx.update().await.unwrap();
                tx.commit().await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = fx.durable.find(&id).await.unwrap();
        assert_eq!(
            stored.cash,
            types::session::starting_cash() - Decimal::from(8)
        );
    }
}
