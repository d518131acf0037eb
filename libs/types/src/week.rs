//! Per-week market data
//!
//! Each session is assigned five weeks of scenario data at crafting time:
//! a set of headlines and one quote per assigned instrument. Week data is
//! write-once per (session, week) and immutable afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of trading weeks in a session
pub const WEEKS_PER_SESSION: u8 = 5;

/// One instrument's quote for one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    #[serde(rename = "company_name")]
    pub company: String,
    pub rating_from: String,
    pub rating_to: String,
    pub action: String,
    pub price: Decimal,
    pub price_change: Decimal,
}

/// Market data for one week of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekData {
    pub headlines: Vec<String>,
    #[serde(rename = "stocks")]
    pub quotes: Vec<Quote>,
}

impl WeekData {
    /// Look up a ticker's quote for this week
    ///
    /// Linear scan; quote lists are a dozen entries. A ticker outside the
    /// session's assigned set has no quote and cannot be traded this week.
    pub fn find_quote(&self, ticker: &str) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.ticker == ticker)
    }
}

/// True when `week` is a valid trading week number
pub fn is_valid_week(week: u8) -> bool {
    (1..=WEEKS_PER_SESSION).contains(&week)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn quote(ticker: &str, price: &str) -> Quote {
        Quote {
            ticker: ticker.to_string(),
            company: String::new(),
            rating_from: String::new(),
            rating_to: String::new(),
            action: String::new(),
            price: Decimal::from_str(price).unwrap(),
            price_change: Decimal::ZERO,
        }
    }

    #[test]
    fn test_find_quote() {
        let week = WeekData {
            headlines: vec!["Markets rally".to_string()],
            quotes: vec![quote("AAPL", "150.00"), quote("MSFT", "300.00")],
        };

        assert_eq!(
            week.find_quote("MSFT").unwrap().price,
            Decimal::from_str("300.00").unwrap()
        );
        assert!(week.find_quote("TSLA").is_none());
    }

    #[test]
    fn test_week_bounds() {
        assert!(!is_valid_week(0));
        assert!(is_valid_week(1));
        assert!(is_valid_week(5));
        assert!(!is_valid_week(6));
    }

    #[test]
    fn test_quote_serde_field_names() {
        let week = WeekData {
            headlines: vec![],
            quotes: vec![quote("AAPL", "150.00")],
        };
        let json = serde_json::to_string(&week).unwrap();
        assert!(json.contains("\"stocks\""));
        assert!(json.contains("\"company_name\""));
    }
}
