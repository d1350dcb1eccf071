use crate::error::AppError;
use crate::models::{CreateOrderRequest, OrderResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use matching_engine::OrderRequest;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::OrderType;

pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    state.rate_limiter.check_rate_limit(
        &format!("{}:order_placement", state.demo_account),
        20,
        20.0,
    )?;

    let symbol = Symbol::parse(payload.symbol.clone())
        .ok_or_else(|| AppError::BadRequest(format!("Unknown symbol: {}", payload.symbol)))?;
    let quantity = Quantity::try_new(payload.amount)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let price = match (payload.order_type, payload.price) {
        (OrderType::Limit, Some(p)) => {
            Some(Price::try_new(p).map_err(|e| AppError::BadRequest(e.to_string()))?)
        }
        (OrderType::Limit, None) => {
            return Err(AppError::BadRequest("limit order requires a price".into()))
        }
        (OrderType::Market, _) => None,
    };

    let report = state.exchange.submit_order(OrderRequest {
        account_id: state.demo_account,
        symbol,
        side: payload.side,
        order_type: payload.order_type,
        price,
        quantity,
    })?;

    Ok(Json(OrderResponse::from_report(&report)))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    state.rate_limiter.check_rate_limit(
        &format!("{}:order_cancel", state.demo_account),
        50,
        50.0,
    )?;

    let order_id: OrderId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Malformed order id: {id}")))?;
    let report = state.exchange.cancel_order(order_id)?;
    Ok(Json(OrderResponse::from_order(&report.order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order_id: OrderId = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Malformed order id: {id}")))?;
    let order = state
        .exchange
        .order(order_id)
        .ok_or_else(|| AppError::NotFound(format!("Order not found: {order_id}")))?;
    Ok(Json(OrderResponse::from_order(&order)))
}
