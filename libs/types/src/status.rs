//! Session status state machine
//!
//! A session moves one-directionally through
//! `Starting → Week1 → … → Week5 → Finished`, with an absorbing `Expired`
//! state reachable from any non-terminal status when the volatile ledger is
//! lost or crafting fails. The closed enum makes every transition an
//! exhaustive match; an invalid status string can never reach business logic.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// State machine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("no trading week for status {status}")]
    NotTrading { status: SessionStatus },

    #[error("cannot advance past week 5")]
    LastWeek,
}

/// Lifecycle status of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, scenario crafting still in flight
    Starting,
    Week1,
    Week2,
    Week3,
    Week4,
    Week5,
    /// Liquidated in week 5; eligible for the leaderboard
    Finished,
    /// Ledger lost or crafting failed; terminal and off the leaderboard
    Expired,
}

impl SessionStatus {
    /// Current trading week, 1..=5
    ///
    /// Fails for any status outside an active trading week: trading and
    /// week-advance both require one.
    pub fn current_week(&self) -> Result<u8, StateError> {
        match self {
            SessionStatus::Week1 => Ok(1),
            SessionStatus::Week2 => Ok(2),
            SessionStatus::Week3 => Ok(3),
            SessionStatus::Week4 => Ok(4),
            SessionStatus::Week5 => Ok(5),
            status => Err(StateError::NotTrading { status: *status }),
        }
    }

    /// Status after a week advance
    pub fn next(&self) -> Result<SessionStatus, StateError> {
        match self {
            SessionStatus::Week1 => Ok(SessionStatus::Week2),
            SessionStatus::Week2 => Ok(SessionStatus::Week3),
            SessionStatus::Week3 => Ok(SessionStatus::Week4),
            SessionStatus::Week4 => Ok(SessionStatus::Week5),
            SessionStatus::Week5 => Err(StateError::LastWeek),
            status => Err(StateError::NotTrading { status: *status }),
        }
    }

    /// True only for the terminal states
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionStatus::Finished | SessionStatus::Expired)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Starting => "starting",
            SessionStatus::Week1 => "week1",
            SessionStatus::Week2 => "week2",
            SessionStatus::Week3 => "week3",
            SessionStatus::Week4 => "week4",
            SessionStatus::Week5 => "week5",
            SessionStatus::Finished => "finished",
            SessionStatus::Expired => "expired",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_week_on_trading_weeks() {
        assert_eq!(SessionStatus::Week1.current_week(), Ok(1));
        assert_eq!(SessionStatus::Week3.current_week(), Ok(3));
        assert_eq!(SessionStatus::Week5.current_week(), Ok(5));
    }

    #[test]
    fn test_current_week_rejects_non_trading_states() {
        for status in [
            SessionStatus::Starting,
            SessionStatus::Finished,
            SessionStatus::Expired,
        ] {
            assert_eq!(
                status.current_week(),
                Err(StateError::NotTrading { status })
            );
        }
    }

    #[test]
    fn test_next_walks_the_weeks() {
        assert_eq!(SessionStatus::Week1.next(), Ok(SessionStatus::Week2));
        assert_eq!(SessionStatus::Week4.next(), Ok(SessionStatus::Week5));
    }

    #[test]
    fn test_next_rejects_week5_and_non_week_states() {
        assert_eq!(SessionStatus::Week5.next(), Err(StateError::LastWeek));
        assert!(SessionStatus::Starting.next().is_err());
        assert!(SessionStatus::Finished.next().is_err());
    }

    #[test]
    fn test_is_finished_only_for_terminal_states() {
        assert!(SessionStatus::Finished.is_finished());
        assert!(SessionStatus::Expired.is_finished());
        assert!(!SessionStatus::Starting.is_finished());
        assert!(!SessionStatus::Week5.is_finished());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Week2).unwrap();
        assert_eq!(json, "\"week2\"");
        let back: SessionStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(back, SessionStatus::Expired);
    }
}
