//! Catalog entities
//!
//! Instruments and categories are static reference data: simple rows with a
//! time-sortable UUID v7 identity, looked up by the crafting pipeline and the
//! paginated catalog endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tradable instrument in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: Uuid,
    pub ticker: String,
    pub company: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Instrument {
    pub fn new(
        ticker: impl Into<String>,
        company: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            ticker: ticker.into(),
            company: company.into(),
            category: category.into(),
            created_at: Utc::now(),
        }
    }
}

/// A stock category players can pick at session creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
