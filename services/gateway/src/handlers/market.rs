use crate::error::AppError;
use crate::models::{BalanceEntry, OrderBookResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use matching_engine::now_nanos;
use types::ids::Symbol;

const BOOK_DEPTH: usize = 20;

/// Path segments cannot carry '/', so pairs arrive as `BTC-USD`.
fn symbol_from_path(raw: &str) -> Result<Symbol, AppError> {
    Symbol::parse(raw.replace('-', "/"))
        .ok_or_else(|| AppError::BadRequest(format!("Unknown symbol: {raw}")))
}

pub async fn list_markets(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .exchange
            .symbols()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

pub async fn get_order_book(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<OrderBookResponse>, AppError> {
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:market_data", state.demo_account), 100, 100.0)?;

    let symbol = symbol_from_path(&symbol)?;
    let snap = state.exchange.book_snapshot(&symbol, BOOK_DEPTH)?;
    Ok(Json(OrderBookResponse::from_snapshot(&snap, now_nanos())))
}

pub async fn get_balances(State(state): State<AppState>) -> Json<Vec<BalanceEntry>> {
    let entries = state
        .exchange
        .ledger()
        .balances_for(state.demo_account)
        .into_iter()
        .map(|(asset, balance)| BalanceEntry {
            asset,
            available: balance.available,
            reserved: balance.reserved,
            total: balance.total(),
        })
        .collect();
    Json(entries)
}
