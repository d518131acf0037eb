//! Scenario generation contract
//!
//! The five-week scenario (headlines plus one quote per instrument per week)
//! comes from an external generator, consumed as a single opaque fallible
//! call. The production implementation lives at the boundary; the scripted
//! generator here backs tests and offline development.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use types::catalog::Instrument;
use types::errors::GameResult;
use types::week::{Quote, WeekData, WEEKS_PER_SESSION};

/// Generated market data, keyed by week number 1..=5
pub type ScenarioWeeks = HashMap<u8, WeekData>;

/// Opaque scenario source
#[async_trait]
pub trait ScenarioGenerator: Send + Sync {
    async fn generate(
        &self,
        categories: &[String],
        instruments: &[Instrument],
    ) -> GameResult<ScenarioWeeks>;
}

/// Deterministic generator for tests and development
///
/// Every instrument starts at a base price derived from its position in the
/// pick and drifts a fixed step per week, so trades have stable, assertable
/// prices.
pub struct ScriptedGenerator;

impl ScriptedGenerator {
    fn base_price(index: usize) -> Decimal {
        Decimal::from(100 + (index as i64) * 25)
    }

    fn week_price(index: usize, week: u8) -> Decimal {
        // +5 per week keeps prices positive and monotonic
        Self::base_price(index) + Decimal::from(5 * (week as i64 - 1))
    }
}

#[async_trait]
impl ScenarioGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        categories: &[String],
        instruments: &[Instrument],
    ) -> GameResult<ScenarioWeeks> {
        let mut weeks = HashMap::new();
        for week in 1..=WEEKS_PER_SESSION {
            let quotes = instruments
                .iter()
                .enumerate()
                .map(|(index, inst)| {
                    let price = Self::week_price(index, week);
                    let previous = if week == 1 {
                        price
                    } else {
                        Self::week_price(index, week - 1)
                    };
                    Quote {
                        ticker: inst.ticker.clone(),
                        company: inst.company.clone(),
                        rating_from: "hold".to_string(),
                        rating_to: "hold".to_string(),
                        action: "maintains".to_string(),
                        price,
                        price_change: price - previous,
                    }
                })
                .collect();

            let headlines = categories
                .iter()
                .map(|category| format!("Week {week}: steady outlook for {category}"))
                .collect();

            weeks.insert(
                week,
                WeekData {
                    headlines,
                    quotes,
                },
            );
        }
        Ok(weeks)
    }
}
