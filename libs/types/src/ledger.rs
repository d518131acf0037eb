//! Holdings ledger with average-cost accounting
//!
//! The ledger is the per-session mapping of ticker → position. It is pure
//! computation: callers check cash sufficiency and supply quoted prices; the
//! ledger only maintains quantities and cost basis.
//!
//! Cost basis is kept as a stored average cost per share, updated only on
//! buys (weighted average). Sells shrink the quantity and leave the average
//! untouched, so the cost of the sold lots falls out proportionally.

use crate::week::WeekData;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Ledger operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("no holding for ticker {ticker}")]
    NotHeld { ticker: String },

    #[error("insufficient shares of {ticker}: requested {requested}, held {held}")]
    InsufficientShares {
        ticker: String,
        requested: u64,
        held: u64,
    },
}

/// A single position: shares held and their average cost per share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: u64,
    pub avg_cost: Decimal,
}

impl Holding {
    /// Cumulative cost basis of the currently-held shares
    pub fn total_cost(&self) -> Decimal {
        self.avg_cost * Decimal::from(self.quantity)
    }

    /// Market value at the given price
    pub fn value_at(&self, price: Decimal) -> Decimal {
        price * Decimal::from(self.quantity)
    }
}

/// Per-session holdings, keyed by ticker
///
/// Invariant: every entry has quantity > 0; positions sold to zero are
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HoldingsLedger {
    holdings: HashMap<String, Holding>,
}

impl HoldingsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&Holding> {
        self.holdings.get(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Holding)> {
        self.holdings.iter()
    }

    /// Drop every position (session liquidation)
    pub fn clear(&mut self) {
        self.holdings.clear();
    }

    /// Record a buy of `qty` shares at `price`
    ///
    /// Never checks funds; the caller debits cash before committing. The
    /// average cost is re-weighted across old and new shares.
    pub fn apply_buy(
        &mut self,
        ticker: &str,
        qty: u64,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        if qty == 0 {
            return Err(LedgerError::InvalidQuantity);
        }

        match self.holdings.get_mut(ticker) {
            Some(holding) => {
                let old_qty = Decimal::from(holding.quantity);
                let new_qty = Decimal::from(holding.quantity + qty);
                holding.avg_cost =
                    (holding.avg_cost * old_qty + price * Decimal::from(qty)) / new_qty;
                holding.quantity += qty;
            }
            None => {
                self.holdings.insert(
                    ticker.to_string(),
                    Holding {
                        quantity: qty,
                        avg_cost: price,
                    },
                );
            }
        }
        Ok(())
    }

    /// Record a sell of `qty` shares
    ///
    /// Requires an existing position of at least `qty`. Proceeds are the
    /// caller's concern (computed at the quoted price, not from cost basis).
    pub fn apply_sell(&mut self, ticker: &str, qty: u64) -> Result<(), LedgerError> {
        if qty == 0 {
            return Err(LedgerError::InvalidQuantity);
        }

        let holding = self
            .holdings
            .get_mut(ticker)
            .ok_or_else(|| LedgerError::NotHeld {
                ticker: ticker.to_string(),
            })?;

        if holding.quantity < qty {
            return Err(LedgerError::InsufficientShares {
                ticker: ticker.to_string(),
                requested: qty,
                held: holding.quantity,
            });
        }

        holding.quantity -= qty;
        if holding.quantity == 0 {
            self.holdings.remove(ticker);
        }
        Ok(())
    }

    /// Market value of all positions at the given week's quotes
    ///
    /// A held ticker with no quote this week contributes zero rather than
    /// failing; a session's own quote set should always cover its holdings.
    pub fn valuation(&self, week_data: &WeekData) -> Decimal {
        self.holdings
            .iter()
            .map(|(ticker, holding)| {
                week_data
                    .find_quote(ticker)
                    .map(|quote| holding.value_at(quote.price))
                    .unwrap_or(Decimal::ZERO)
            })
            .sum()
    }
}
