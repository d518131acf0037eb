//! Session record and state views
//!
//! The session is the durable system of record for one player's run: cash,
//! holdings valuation, total balance, lifecycle status, timestamps. The
//! holdings ledger itself lives in the volatile store and is attached to the
//! session only inside a coordinated transaction or a state view.

use crate::ledger::HoldingsLedger;
use crate::status::SessionStatus;
use crate::token::SessionToken;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cash balance every new session starts with
pub fn starting_cash() -> Decimal {
    Decimal::new(10_000_00, 2)
}

/// Durable session record
///
/// Invariant after every mutation: `total_balance == cash + holdings_value`.
/// Sessions are never deleted; they end in `Finished` or `Expired`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionToken,
    pub owner: String,
    pub cash: Decimal,
    pub holdings_value: Decimal,
    pub total_balance: Decimal,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session in `Starting` with the fixed cash balance
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        let cash = starting_cash();
        Self {
            session_id: SessionToken::generate(),
            owner: owner.into(),
            cash,
            holdings_value: Decimal::ZERO,
            total_balance: cash,
            status: SessionStatus::Starting,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the balance invariant: total = cash + holdings value
    pub fn check_invariant(&self) -> bool {
        self.total_balance == self.cash + self.holdings_value
    }

    /// Recompute valuation-derived fields and stamp the update time
    pub fn revalue(&mut self, holdings_value: Decimal) {
        self.holdings_value = holdings_value;
        self.total_balance = self.cash + holdings_value;
        self.updated_at = Utc::now();
    }
}

/// Session snapshot with its ledger attached, as returned to the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(flatten)]
    pub session: Session,
    pub holdings: HoldingsLedger,
}
