use crate::error::AppError;
use crate::models::{
    DepositAddressRequest, DepositAddressResponse, NetworkFeeResponse, SendTransactionRequest,
    TransactionResponse, ValidateAddressRequest, ValidateAddressResponse,
};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use matching_engine::now_nanos;
use wallet::{generate_deposit_address, validate_address};

pub async fn send_transaction(
    State(state): State<AppState>,
    Json(payload): Json<SendTransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    state.rate_limiter.check_rate_limit(
        &format!("{}:wallet_send", state.demo_account),
        10,
        10.0,
    )?;

    let transfer = state.transfers.initiate_transfer(
        state.demo_account,
        &payload.asset,
        &payload.to,
        payload.amount,
        now_nanos(),
    )?;
    Ok(Json(TransactionResponse::from(&transfer)))
}

/// Fail-closed: any asset without a known address scheme reports invalid.
pub async fn check_address(
    Query(params): Query<ValidateAddressRequest>,
) -> Json<ValidateAddressResponse> {
    Json(ValidateAddressResponse {
        valid: validate_address(&params.address, &params.asset),
    })
}

pub async fn get_network_fee(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> Result<Json<NetworkFeeResponse>, AppError> {
    let fee = state.transfers.quote_network_fee(&asset)?;
    Ok(Json(NetworkFeeResponse { asset, fee }))
}

pub async fn get_deposit_address(
    State(state): State<AppState>,
    Json(payload): Json<DepositAddressRequest>,
) -> Result<Json<DepositAddressResponse>, AppError> {
    let asset = payload.asset;
    let address = generate_deposit_address(state.demo_account, &asset)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported asset: {asset}")))?;
    Ok(Json(DepositAddressResponse { asset, address }))
}
