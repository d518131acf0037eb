//! Reference-data handlers (public, no session required)

use axum::Json;
use axum::extract::{Query, State};
use types::catalog::{Category, Instrument};
use types::errors::GameError;

use crate::error::AppError;
use crate::models::{PageQuery, Paginated};
use crate::state::AppState;

const MAX_PAGE_SIZE: usize = 100;

fn validate(query: &PageQuery) -> Result<(), AppError> {
    if query.page == 0 || query.limit == 0 || query.limit > MAX_PAGE_SIZE {
        return Err(GameError::InvalidInput(format!(
            "page must be >= 1 and limit in 1..={MAX_PAGE_SIZE}"
        ))
        .into());
    }
    Ok(())
}

pub async fn list_stocks(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Instrument>>, AppError> {
    validate(&query)?;
    let (items, total) = state.catalog.instruments_page(query.page, query.limit).await?;
    Ok(Json(Paginated {
        items,
        page: query.page,
        limit: query.limit,
        total,
    }))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<Category>>, AppError> {
    validate(&query)?;
    let (items, total) = state.catalog.categories_page(query.page, query.limit).await?;
    Ok(Json(Paginated {
        items,
        page: query.page,
        limit: query.limit,
        total,
    }))
}
