//! Wire contract shared with the web front-end
//!
//! Field names and status vocabularies here are load-bearing: the front-end
//! matches on them verbatim. Order responses report `completed`, `pending`,
//! or `failed` rather than the engine's internal lifecycle states, and all
//! timestamps go out in Unix milliseconds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::trade::Trade;
use types::transfer::{FiatStatus, FiatTransaction, Transfer, TransferStatus};

use matching_engine::book::BookSnapshot;
use matching_engine::ExecutionReport;

/// Nanosecond timestamps are internal; the wire carries milliseconds.
pub fn nanos_to_millis(nanos: i64) -> i64 {
    nanos / 1_000_000
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// `buy` or `sell`.
    #[serde(rename = "type")]
    pub side: Side,
    pub symbol: String,
    pub order_type: OrderType,
    /// Base-asset quantity.
    pub amount: Decimal,
    /// Required for limit orders; market orders price at match time.
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub status: String,
    pub executed_price: Decimal,
    pub executed_amount: Decimal,
    pub fee: Decimal,
    pub timestamp: i64,
}

impl OrderResponse {
    /// Build the front-end view of a submission outcome.
    ///
    /// `executedPrice` is the volume-weighted average across the taker's
    /// fills, zero when nothing executed. `fee` is the sum of taker fees,
    /// denominated in the asset the taker received.
    pub fn from_report(report: &ExecutionReport) -> Self {
        Self::from_order_and_trades(&report.order, &report.trades)
    }

    pub fn from_order_and_trades(order: &Order, trades: &[Trade]) -> Self {
        let executed_amount: Decimal =
            trades.iter().map(|t| t.quantity.as_decimal()).sum();
        let notional: Decimal = trades.iter().map(|t| t.quantity.notional(t.price)).sum();
        let executed_price = if executed_amount.is_zero() {
            Decimal::ZERO
        } else {
            notional / executed_amount
        };
        let fee: Decimal = trades.iter().map(|t| t.taker_fee).sum();

        Self {
            order_id: order.order_id.to_string(),
            status: order_wire_status(order).to_string(),
            executed_price,
            executed_amount,
            fee,
            timestamp: nanos_to_millis(order.updated_at),
        }
    }

    /// View of an order fetched after the fact, without its fill history.
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            status: order_wire_status(order).to_string(),
            executed_price: order
                .limit_price
                .map(|p| p.as_decimal())
                .unwrap_or(Decimal::ZERO),
            executed_amount: order.filled_quantity.as_decimal(),
            fee: Decimal::ZERO,
            timestamp: nanos_to_millis(order.updated_at),
        }
    }
}

/// Collapse the order lifecycle into the three states the front-end knows.
///
/// A cancelled order that filled partially still delivered an execution, so
/// it reports `completed`; one that never traded reports `failed`.
fn order_wire_status(order: &Order) -> &'static str {
    match order.status {
        OrderStatus::Filled => "completed",
        OrderStatus::Open | OrderStatus::PartiallyFilled => "pending",
        OrderStatus::Cancelled => {
            if order.has_fills() {
                "completed"
            } else {
                "failed"
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionRequest {
    pub asset: String,
    pub to: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub hash: String,
    pub status: String,
    pub confirmations: u32,
    pub timestamp: i64,
}

impl From<&Transfer> for TransactionResponse {
    fn from(transfer: &Transfer) -> Self {
        let status = match transfer.status {
            TransferStatus::Pending => "pending",
            TransferStatus::Confirmed => "confirmed",
            TransferStatus::Failed => "failed",
        };
        Self {
            hash: transfer.tx_hash.clone(),
            status: status.to_string(),
            confirmations: transfer.confirmations,
            timestamp: nanos_to_millis(transfer.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAddressRequest {
    pub asset: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAddressResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFeeResponse {
    pub asset: String,
    pub fee: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressRequest {
    pub asset: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressResponse {
    pub asset: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatRequest {
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FiatResponse {
    pub transaction_id: String,
    pub status: String,
    pub message: String,
}

impl From<&FiatTransaction> for FiatResponse {
    fn from(tx: &FiatTransaction) -> Self {
        let status = match tx.status {
            FiatStatus::Pending => "pending",
            FiatStatus::Completed => "completed",
            FiatStatus::Failed => "failed",
        };
        Self {
            transaction_id: tx.transaction_id.to_string(),
            status: status.to_string(),
            message: tx.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub asset: String,
    pub available: Decimal,
    pub reserved: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLevelView {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookResponse {
    pub symbol: String,
    pub bids: Vec<BookLevelView>,
    pub asks: Vec<BookLevelView>,
    pub timestamp: i64,
}

impl OrderBookResponse {
    pub fn from_snapshot(snap: &BookSnapshot, timestamp_nanos: i64) -> Self {
        let levels = |side: &[(types::numeric::Price, types::numeric::Quantity)]| {
            side.iter()
                .map(|(p, q)| BookLevelView {
                    price: p.as_decimal(),
                    amount: q.as_decimal(),
                })
                .collect()
        };
        Self {
            symbol: snap.symbol.to_string(),
            bids: levels(&snap.bids),
            asks: levels(&snap.asks),
            timestamp: nanos_to_millis(timestamp_nanos),
        }
    }
}
