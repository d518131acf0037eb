//! Error taxonomy for the game backend
//!
//! Every failure surfaced to a caller carries one of a small set of
//! classifications with a stable wire code; the HTTP boundary maps codes to
//! status lines without inspecting messages.

use crate::ledger::LedgerError;
use crate::status::StateError;
use thiserror::Error;

/// Top-level game error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Bad quantity, wrong category count, malformed week number, insufficient funds
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation not legal in the session's current status
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Unknown session, ticker, or week
    #[error("not found: {0}")]
    NotFound(String),

    /// Session terminal or its ledger expired
    #[error("not available: {0}")]
    NotAvailable(String),

    /// Missing or malformed session token
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Store, generator, or lock failure
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used across the backend
pub type GameResult<T> = Result<T, GameError>;

impl GameError {
    /// Stable wire code for this classification
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidInput(_) => "INVALID_INPUT",
            GameError::InvalidState(_) => "INVALID_STATE",
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::NotAvailable(_) => "NOT_AVAILABLE",
            GameError::Unauthorized(_) => "UNAUTHORIZED",
            GameError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LedgerError> for GameError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotHeld { .. } => GameError::NotFound(err.to_string()),
            LedgerError::InvalidQuantity | LedgerError::InsufficientShares { .. } => {
                GameError::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<StateError> for GameError {
    fn from(err: StateError) -> Self {
        GameError::InvalidState(err.to_string())
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Internal(format!("serialization failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(GameError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(GameError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_ledger_errors_classify() {
        let not_held: GameError = LedgerError::NotHeld {
            ticker: "AAPL".into(),
        }
        .into();
        assert!(matches!(not_held, GameError::NotFound(_)));

        let oversell: GameError = LedgerError::InsufficientShares {
            ticker: "AAPL".into(),
            requested: 5,
            held: 3,
        }
        .into();
        assert!(matches!(oversell, GameError::InvalidInput(_)));
    }

    #[test]
    fn test_state_errors_classify() {
        let err: GameError = StateError::LastWeek.into();
        assert!(matches!(err, GameError::InvalidState(_)));
    }
}
