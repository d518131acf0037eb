//! Trading service
//!
//! Orchestrates every session operation. Each trade runs as
//! `begin → compute → update → commit` on the coordinator; an early return
//! drops the open transaction, which rolls the durable unit of work back.

use crate::catalog::Catalog;
use crate::coordinator::TransactionCoordinator;
use crate::crafting::CraftingPipeline;
use crate::scenario::ScenarioGenerator;
use crate::store::{DurableStore, VolatileStore};
use crate::tasks::TaskRunner;
use crate::week_data::WeekDataStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use types::errors::{GameError, GameResult};
use types::ledger::HoldingsLedger;
use types::session::{Session, SessionState};
use types::status::SessionStatus;
use types::token::SessionToken;

/// Leaderboard page served to the boundary
const LEADERBOARD_SIZE: usize = 10;

/// Queue depth for background crafting jobs
const CRAFTING_QUEUE: usize = 100;

pub struct TradingService {
    durable: Arc<dyn DurableStore>,
    coordinator: TransactionCoordinator,
    week_data: WeekDataStore,
    crafting: Arc<CraftingPipeline>,
    tasks: TaskRunner,
}

impl TradingService {
    /// Wire the service from its collaborators; must be called inside a
    /// tokio runtime (the task runner starts its dispatcher)
    pub fn new(
        durable: Arc<dyn DurableStore>,
        volatile: Arc<dyn VolatileStore>,
        catalog: Arc<dyn Catalog>,
        generator: Arc<dyn ScenarioGenerator>,
    ) -> Self {
        let week_data = WeekDataStore::new(Arc::clone(&volatile));
        let coordinator =
            TransactionCoordinator::new(Arc::clone(&durable), Arc::clone(&volatile));
        let crafting = Arc::new(CraftingPipeline::new(
            Arc::clone(&durable),
            catalog,
            generator,
            week_data.clone(),
        ));

        Self {
            durable,
            coordinator,
            week_data,
            crafting,
            tasks: TaskRunner::new(CRAFTING_QUEUE),
        }
    }

    /// Create a session and dispatch crafting
    ///
    /// Returns as soon as the durable row and the empty ledger exist; the
    /// scenario is not ready yet, and callers poll `get_state` until the
    /// session reaches week 1.
    pub async fn create(
        &self,
        owner: &str,
        categories: Vec<String>,
    ) -> GameResult<SessionToken> {
        let session = Session::new(owner);
        let id = session.session_id.clone();

        self.durable.insert(&session).await?;
        self.coordinator
            .write_ledger(&id, &HoldingsLedger::new())
            .await?;

        let pipeline = Arc::clone(&self.crafting);
        let task_id = id.clone();
        self.tasks
            .dispatch(async move { pipeline.run(task_id, categories).await })
            .await?;

        tracing::info!(session = %id, owner, "session created, crafting dispatched");
        Ok(id)
    }

    /// Read-only session snapshot with holdings attached
    pub async fn get_state(&self, id: &SessionToken) -> GameResult<SessionState> {
        let session = self.durable.find(id).await?;
        if session.status.is_finished() {
            return Err(GameError::NotAvailable(format!(
                "session {id} is no longer active"
            )));
        }

        match self.coordinator.read_ledger(id).await? {
            Some(holdings) => Ok(SessionState { session, holdings }),
            None => {
                if let Err(err) = self.coordinator.expire(id).await {
                    tracing::error!(session = %id, %err, "failed to mark session expired");
                }
                Err(GameError::NotAvailable(format!("session {id} has expired")))
            }
        }
    }

    /// Buy `qty` shares of `ticker` at this week's quoted price
    pub async fn buy(
        &self,
        id: &SessionToken,
        ticker: &str,
        qty: u64,
    ) -> GameResult<SessionState> {
        if qty == 0 {
            return Err(GameError::InvalidInput("quantity must be positive".into()));
        }

        let mut tx = self.coordinator.begin(id).await?;
        let week = tx.session().status.current_week()?;
        let week_data = self.week_data.get(id, week).await?;

        let price = week_data
            .find_quote(ticker)
            .map(|quote| quote.price)
            .ok_or_else(|| {
                GameError::NotFound(format!("no quote for {ticker} in week {week}"))
            })?;

        let cost = price * Decimal::from(qty);
        if cost > tx.session().cash {
            return Err(GameError::InvalidInput(format!(
                "insufficient funds: cost {cost}, cash {}",
                tx.session().cash
            )));
        }

        tx.ledger_mut().apply_buy(ticker, qty, price)?;
        tx.session_mut().cash -= cost;
        let value = tx.ledger().valuation(&week_data);
        tx.session_mut().revalue(value);

        tx.update().await?;
        let state = SessionState {
            session: tx.session().clone(),
            holdings: tx.ledger().clone(),
        };
        tx.commit().await?;

        tracing::debug!(session = %id, ticker, qty, %price, "buy filled");
        Ok(state)
    }

    /// Sell `qty` shares of `ticker` at this week's quoted price
    pub async fn sell(
        &self,
        id: &SessionToken,
        ticker: &str,
        qty: u64,
    ) -> GameResult<SessionState> {
        if qty == 0 {
            return Err(GameError::InvalidInput("quantity must be positive".into()));
        }

        let mut tx = self.coordinator.begin(id).await?;
        let week = tx.session().status.current_week()?;
        let week_data = self.week_data.get(id, week).await?;

        // The sell must fill at a quoted price; an unquoted ticker cannot be
        // priced even if somehow held
        let price = week_data
            .find_quote(ticker)
            .map(|quote| quote.price)
            .ok_or_else(|| {
                GameError::NotFound(format!("no quote for {ticker} in week {week}"))
            })?;

        tx.ledger_mut().apply_sell(ticker, qty)?;
        tx.session_mut().cash += price * Decimal::from(qty);
        let value = tx.ledger().valuation(&week_data);
        tx.session_mut().revalue(value);

        tx.update().await?;
        let state = SessionState {
            session: tx.session().clone(),
            holdings: tx.ledger().clone(),
        };
        tx.commit().await?;

        tracing::debug!(session = %id, ticker, qty, %price, "sell filled");
        Ok(state)
    }

    /// Advance the session to the next week, marking holdings to the new
    /// week's prices
    pub async fn advance_week(&self, id: &SessionToken) -> GameResult<SessionState> {
        let mut tx = self.coordinator.begin(id).await?;
        let next = tx.session().status.next()?;
        // next() only returns week statuses, so current_week cannot fail here
        let week = next.current_week()?;
        let week_data = self.week_data.get(id, week).await?;

        tx.session_mut().status = next;
        let value = tx.ledger().valuation(&week_data);
        tx.session_mut().revalue(value);

        tx.update().await?;
        let state = SessionState {
            session: tx.session().clone(),
            holdings: tx.ledger().clone(),
        };
        tx.commit().await?;

        tracing::info!(session = %id, %next, "advanced to next week");
        Ok(state)
    }

    /// Liquidate every holding at week-5 prices and finish the session
    pub async fn end_session(&self, id: &SessionToken) -> GameResult<Session> {
        let mut tx = self.coordinator.begin(id).await?;
        if tx.session().status != SessionStatus::Week5 {
            return Err(GameError::InvalidState(format!(
                "can only end a session in week 5, status is {}",
                tx.session().status
            )));
        }

        let week_data = self.week_data.get(id, 5).await?;
        let proceeds: Decimal = tx
            .ledger()
            .iter()
            .map(|(ticker, holding)| {
                week_data
                    .find_quote(ticker)
                    .map(|quote| holding.value_at(quote.price))
                    .unwrap_or(Decimal::ZERO)
            })
            .sum();

        tx.session_mut().cash += proceeds;
        tx.ledger_mut().clear();
        tx.session_mut().status = SessionStatus::Finished;
        tx.session_mut().revalue(Decimal::ZERO);

        tx.update().await?;
        let session = tx.session().clone();
        tx.commit().await?;

        tracing::info!(session = %id, final_cash = %session.cash, "session finished");
        Ok(session)
    }

    /// Top finished sessions by final cash
    pub async fn get_leaderboard(&self) -> GameResult<Vec<Session>> {
        self.durable.leaderboard(1, LEADERBOARD_SIZE).await
    }

    /// One week of the session's market data
    pub async fn get_week_data(
        &self,
        id: &SessionToken,
        week: u8,
    ) -> GameResult<types::week::WeekData> {
        let session = self.durable.find(id).await?;
        if session.status.is_finished() {
            return Err(GameError::NotAvailable(format!(
                "session {id} is no longer active"
            )));
        }
        self.week_data.get(id, week).await
    }
}
