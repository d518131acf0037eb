//! Instrument and category catalog
//!
//! Static reference data behind a contract: paginated lookups for the
//! boundary layer and the random per-category instrument pick used by the
//! crafting pipeline.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use types::catalog::{Category, Instrument};
use types::errors::{GameError, GameResult};

/// Instruments picked per category when assembling a session
pub const INSTRUMENTS_PER_CATEGORY: usize = 4;

/// Categories every session trades across
pub const CATEGORIES_PER_SESSION: usize = 3;

/// Catalog contract
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All category names, in catalog order
    async fn find_all_categories(&self) -> GameResult<Vec<Category>>;

    /// Paginated categories with the total count
    async fn categories_page(&self, page: usize, limit: usize)
        -> GameResult<(Vec<Category>, usize)>;

    /// Paginated instruments with the total count
    async fn instruments_page(
        &self,
        page: usize,
        limit: usize,
    ) -> GameResult<(Vec<Instrument>, usize)>;

    /// Single instrument by ticker
    async fn find_instrument(&self, ticker: &str) -> GameResult<Instrument>;

    /// Random pick of instruments for a session: a fixed count per category,
    /// exactly three categories required
    async fn pick_instruments(&self, categories: &[String]) -> GameResult<Vec<Instrument>>;
}

fn page_slice<T: Clone>(items: &[T], page: usize, limit: usize) -> Vec<T> {
    let offset = page.saturating_sub(1).saturating_mul(limit);
    items.iter().skip(offset).take(limit).cloned().collect()
}

/// Fixed, in-memory catalog
pub struct MemoryCatalog {
    categories: Vec<Category>,
    instruments: Vec<Instrument>,
}

impl MemoryCatalog {
    pub fn new(categories: Vec<Category>, instruments: Vec<Instrument>) -> Self {
        Self {
            categories,
            instruments,
        }
    }

    /// Demo catalog used by the development server and the test suites
    pub fn seeded() -> Self {
        let categories = ["Tech", "Health", "Energy", "Finance", "Retail"]
            .into_iter()
            .map(Category::new)
            .collect();

        let instruments = [
            ("AAPL", "Apple Inc.", "Tech"),
            ("MSFT", "Microsoft Corp.", "Tech"),
            ("NVDA", "NVIDIA Corp.", "Tech"),
            ("GOOG", "Alphabet Inc.", "Tech"),
            ("ORCL", "Oracle Corp.", "Tech"),
            ("PFE", "Pfizer Inc.", "Health"),
            ("JNJ", "Johnson & Johnson", "Health"),
            ("MRNA", "Moderna Inc.", "Health"),
            ("UNH", "UnitedHealth Group", "Health"),
            ("XOM", "Exxon Mobil Corp.", "Energy"),
            ("CVX", "Chevron Corp.", "Energy"),
            ("SHEL", "Shell plc", "Energy"),
            ("NEE", "NextEra Energy", "Energy"),
            ("JPM", "JPMorgan Chase", "Finance"),
            ("GS", "Goldman Sachs", "Finance"),
            ("V", "Visa Inc.", "Finance"),
            ("BAC", "Bank of America", "Finance"),
            ("WMT", "Walmart Inc.", "Retail"),
            ("COST", "Costco Wholesale", "Retail"),
            ("TGT", "Target Corp.", "Retail"),
            ("HD", "Home Depot", "Retail"),
        ]
        .into_iter()
        .map(|(ticker, company, category)| Instrument::new(ticker, company, category))
        .collect();

        Self::new(categories, instruments)
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn find_all_categories(&self) -> GameResult<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn categories_page(
        &self,
        page: usize,
        limit: usize,
    ) -> GameResult<(Vec<Category>, usize)> {
        Ok((
            page_slice(&self.categories, page, limit),
            self.categories.len(),
        ))
    }

    async fn instruments_page(
        &self,
        page: usize,
        limit: usize,
    ) -> GameResult<(Vec<Instrument>, usize)> {
        Ok((
            page_slice(&self.instruments, page, limit),
            self.instruments.len(),
        ))
    }

    async fn find_instrument(&self, ticker: &str) -> GameResult<Instrument> {
        self.instruments
            .iter()
            .find(|inst| inst.ticker == ticker)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("instrument {ticker} not found")))
    }

    async fn pick_instruments(&self, categories: &[String]) -> GameResult<Vec<Instrument>> {
        if categories.len() != CATEGORIES_PER_SESSION {
            return Err(GameError::InvalidInput(format!(
                "exactly {CATEGORIES_PER_SESSION} categories required"
            )));
        }

        let mut rng = rand::thread_rng();
        let mut picked = Vec::with_capacity(categories.len() * INSTRUMENTS_PER_CATEGORY);
        for category in categories {
            let pool: Vec<&Instrument> = self
                .instruments
                .iter()
                .filter(|inst| inst.category == *category)
                .collect();
            picked.extend(
                pool.choose_multiple(&mut rng, INSTRUMENTS_PER_CATEGORY)
                    .map(|inst| (*inst).clone()),
            );
        }
        Ok(picked)
    }
}
