//! OpenRouter-backed scenario generator
//!
//! Asks a chat-completions model for the full five-week scenario in one
//! shot. Model output is free-form text around a JSON payload, so parsing
//! extracts the first balanced JSON object before deserializing. Any
//! failure here surfaces as an internal error and the crafting pipeline
//! expires the session.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt::Write as _;
use trading::scenario::{ScenarioGenerator, ScenarioWeeks};
use types::catalog::Instrument;
use types::errors::{GameError, GameResult};
use types::week::{WEEKS_PER_SESSION, WeekData};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub struct OpenRouterGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ScenarioPayload {
    weeks: HashMap<String, WeekData>,
}

impl OpenRouterGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from `OPENROUTER_API_KEY` and `OPENROUTER_MODEL_NAME`;
    /// `None` when the key is absent
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").ok()?;
        let model = std::env::var("OPENROUTER_MODEL_NAME")
            .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());
        Some(Self::new(api_key, model))
    }

    fn build_prompt(categories: &[String], instruments: &[Instrument]) -> String {
        let mut prompt = String::new();
        let _ = writeln!(
            prompt,
            "Simulate a {WEEKS_PER_SESSION}-week stock market scenario for the categories: {}.",
            categories.join(", ")
        );
        let _ = writeln!(prompt, "The tradable stocks are:");
        for inst in instruments {
            let _ = writeln!(
                prompt,
                "- {} ({}), category {}",
                inst.ticker, inst.company, inst.category
            );
        }
        let _ = writeln!(
            prompt,
            "\nRespond with a single JSON object of the form \
             {{\"weeks\": {{\"week1\": {{\"headlines\": [...], \"stocks\": [...]}}, ..., \"week5\": {{...}}}}}}.\n\
             Each stocks entry must be an object with fields ticker, company_name, \
             rating_from, rating_to, action, price, price_change, and every listed \
             ticker must appear in every week with a positive price. Headlines are \
             short market-news strings that justify the price moves. Do not include \
             any text outside the JSON object."
        );
        prompt
    }

    fn parse_weeks(content: &str) -> GameResult<ScenarioWeeks> {
        let object = extract_first_json_object(content).ok_or_else(|| {
            GameError::Internal("no JSON object in model response".to_string())
        })?;

        let payload: ScenarioPayload = serde_json::from_str(object)
            .map_err(|err| GameError::Internal(format!("malformed scenario JSON: {err}")))?;

        let mut weeks = ScenarioWeeks::new();
        for (key, data) in payload.weeks {
            let number: u8 = key
                .strip_prefix("week")
                .and_then(|n| n.parse().ok())
                .filter(|n| (1..=WEEKS_PER_SESSION).contains(n))
                .ok_or_else(|| {
                    GameError::Internal(format!("unexpected week key {key:?} in scenario"))
                })?;
            weeks.insert(number, data);
        }

        if weeks.len() != WEEKS_PER_SESSION as usize {
            return Err(GameError::Internal(format!(
                "scenario has {} weeks, expected {WEEKS_PER_SESSION}",
                weeks.len()
            )));
        }
        Ok(weeks)
    }
}

#[async_trait]
impl ScenarioGenerator for OpenRouterGenerator {
    async fn generate(
        &self,
        categories: &[String],
        instruments: &[Instrument],
    ) -> GameResult<ScenarioWeeks> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a stock market game master that provides realistic market simulation data.",
                },
                {
                    "role": "user",
                    "content": Self::build_prompt(categories, instruments),
                },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| GameError::Internal(format!("scenario request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameError::Internal(format!(
                "scenario request returned {status}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|err| GameError::Internal(format!("malformed completion body: {err}")))?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| GameError::Internal("completion has no choices".to_string()))?;

        Self::parse_weeks(content)
    }
}

/// First balanced `{ ... }` object in `raw`, string- and escape-aware
fn extract_first_json_object(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    let start = raw.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_string {
            match byte {
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn week_json(price: &str) -> String {
        format!(
            r#"{{"headlines": ["Markets move"], "stocks": [{{"ticker": "AAPL", "company_name": "Apple Inc.", "rating_from": "hold", "rating_to": "buy", "action": "upgraded", "price": {price}, "price_change": 1.5}}]}}"#
        )
    }

    fn scenario_json() -> String {
        let weeks: Vec<String> = (1..=5)
            .map(|week| format!(r#""week{week}": {}"#, week_json("150.25")))
            .collect();
        format!(r#"{{"weeks": {{{}}}}}"#, weeks.join(", "))
    }

    #[test]
    fn test_extracts_object_from_prose() {
        let raw = format!("Sure! Here is the data:\n```json\n{}\n```", scenario_json());
        let object = extract_first_json_object(&raw).unwrap();
        assert!(object.starts_with('{'));
        assert!(object.ends_with('}'));
        assert!(serde_json::from_str::<serde_json::Value>(object).is_ok());
    }

    #[test]
    fn test_extraction_ignores_braces_inside_strings() {
        let raw = r#"note {"text": "open { brace", "n": 1} trailing"#;
        assert_eq!(
            extract_first_json_object(raw),
            Some(r#"{"text": "open { brace", "n": 1}"#)
        );
    }

    #[test]
    fn test_parse_weeks_happy_path() {
        let weeks = OpenRouterGenerator::parse_weeks(&scenario_json()).unwrap();
        assert_eq!(weeks.len(), 5);
        let quote = weeks[&3].find_quote("AAPL").unwrap();
        assert_eq!(quote.price, Decimal::new(15025, 2));
        assert_eq!(quote.company, "Apple Inc.");
    }

    #[test]
    fn test_parse_weeks_rejects_missing_weeks() {
        let partial = format!(r#"{{"weeks": {{"week1": {}}}}}"#, week_json("100"));
        assert!(OpenRouterGenerator::parse_weeks(&partial).is_err());
    }

    #[test]
    fn test_parse_weeks_rejects_unknown_keys() {
        let bad = format!(r#"{{"weeks": {{"week9": {}}}}}"#, week_json("100"));
        assert!(OpenRouterGenerator::parse_weeks(&bad).is_err());
    }

    #[test]
    fn test_no_object_is_error() {
        assert!(OpenRouterGenerator::parse_weeks("no json here").is_err());
    }
}
