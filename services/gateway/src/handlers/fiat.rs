use crate::error::AppError;
use crate::models::{FiatRequest, FiatResponse};
use crate::state::AppState;
use axum::{extract::State, Json};
use matching_engine::now_nanos;

pub async fn deposit(
    State(state): State<AppState>,
    Json(payload): Json<FiatRequest>,
) -> Result<Json<FiatResponse>, AppError> {
    state.rate_limiter.check_rate_limit(
        &format!("{}:fiat", state.demo_account),
        10,
        10.0,
    )?;

    let tx = state.fiat.deposit_fiat(
        state.demo_account,
        &payload.currency,
        payload.amount,
        &payload.payment_method,
        now_nanos(),
    )?;
    Ok(Json(FiatResponse::from(&tx)))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Json(payload): Json<FiatRequest>,
) -> Result<Json<FiatResponse>, AppError> {
    state.rate_limiter.check_rate_limit(
        &format!("{}:fiat", state.demo_account),
        10,
        10.0,
    )?;

    let tx = state.fiat.withdraw_fiat(
        state.demo_account,
        &payload.currency,
        payload.amount,
        &payload.payment_method,
        now_nanos(),
    )?;
    Ok(Json(FiatResponse::from(&tx)))
}
