//! Per-session trade rate limiting
//!
//! Fixed-window counter keyed by session token. Trades are the only
//! rate-limited routes; reads are cheap enough to leave open.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use types::token::SessionToken;

use crate::error::AppError;

/// Fixed-window rate limiter
pub struct TradeLimiter {
    windows: DashMap<SessionToken, Window>,
    limit: u32,
    window: Duration,
}

struct Window {
    started: Instant,
    count: u32,
}

impl TradeLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    /// Default policy: 30 trades per 10 seconds per session
    pub fn for_trades() -> Self {
        Self::new(30, Duration::from_secs(10))
    }

    /// Count one request against the session's window
    pub fn check(&self, token: &SessionToken) -> Result<(), AppError> {
        let now = Instant::now();
        let mut entry = self.windows.entry(token.clone()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.limit {
            return Err(AppError::RateLimitExceeded(format!(
                "too many trades, retry in {}s",
                self.window.as_secs()
            )));
        }

        entry.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = TradeLimiter::new(3, Duration::from_secs(60));
        let token = SessionToken::from("s1");

        for _ in 0..3 {
            assert!(limiter.check(&token).is_ok());
        }
        assert!(limiter.check(&token).is_err());
    }

    #[test]
    fn test_sessions_are_independent() {
        let limiter = TradeLimiter::new(1, Duration::from_secs(60));
        let a = SessionToken::from("a");
        let b = SessionToken::from("b");

        assert!(limiter.check(&a).is_ok());
        assert!(limiter.check(&a).is_err());
        assert!(limiter.check(&b).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let limiter = TradeLimiter::new(1, Duration::from_millis(10));
        let token = SessionToken::from("s1");

        assert!(limiter.check(&token).is_ok());
        assert!(limiter.check(&token).is_err());
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.check(&token).is_ok());
    }
}
