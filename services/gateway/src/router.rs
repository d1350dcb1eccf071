use crate::handlers::{fiat, market, order, wallet};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/orders", post(order::create_order))
        .route("/orders/{id}", get(order::get_order))
        .route("/orders/{id}", delete(order::cancel_order))
        .route("/markets", get(market::list_markets))
        .route("/markets/{symbol}/book", get(market::get_order_book))
        .route("/balances", get(market::get_balances))
        .route("/wallet/send", post(wallet::send_transaction))
        .route("/wallet/validate", get(wallet::check_address))
        .route("/wallet/fee/{asset}", get(wallet::get_network_fee))
        .route("/wallet/deposit-address", post(wallet::get_deposit_address))
        .route("/fiat/deposit", post(fiat::deposit))
        .route("/fiat/withdraw", post(fiat::withdraw));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use ledger::Ledger;
    use matching_engine::{Exchange, FeeSchedule, NoopJournal};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tower::ServiceExt;
    use types::ids::{AccountId, Symbol};
    use ::wallet::{FiatGateway, SimulatedNetwork, StaticFeeSchedule, TransferService, UnreachableRail};

    fn test_app() -> (Router, AccountId, Arc<Ledger>) {
        let ledger = Arc::new(Ledger::new());
        let account = AccountId::new();
        ledger.deposit(account, "USD", Decimal::from(1_000_000));
        ledger.deposit(account, "BTC", Decimal::from(10));
        ledger.deposit(account, "ETH", Decimal::from(100));

        let exchange = Arc::new(Exchange::new(
            Arc::clone(&ledger),
            [Symbol::new("BTC/USD"), Symbol::new("ETH/USD")],
            Box::new(NoopJournal),
            FeeSchedule::default(),
            1,
        ));
        let transfers = Arc::new(TransferService::new(
            Arc::clone(&ledger),
            Box::<StaticFeeSchedule>::default(),
            Box::new(SimulatedNetwork),
        ));
        let fiat = Arc::new(FiatGateway::new(
            Arc::clone(&ledger),
            Box::new(UnreachableRail),
        ));

        let app = create_router(AppState::new(exchange, transfers, fiat, account));
        (app, account, ledger)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_limit_order_rests_as_pending() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app,
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"limit","amount":"1","price":"50000"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["executedAmount"], "0");
        assert!(json["orderId"].is_string());
    }

    #[tokio::test]
    async fn test_crossing_orders_complete_at_maker_price() {
        let (app, _, _) = test_app();
        send(
            app.clone(),
            post_json(
                "/api/orders",
                r#"{"type":"sell","symbol":"BTC/USD","orderType":"limit","amount":"1","price":"49000"}"#,
            ),
        )
        .await;
        let (status, json) = send(
            app,
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"limit","amount":"1","price":"50000"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["executedPrice"], "49000");
        assert_eq!(json["executedAmount"], "1");
    }

    #[tokio::test]
    async fn test_market_order_no_liquidity_reports_failed() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app,
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"market","amount":"1"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["executedAmount"], "0");
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_bad_request() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app,
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"limit","amount":"1000","price":"50000"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "INSUFFICIENT_BALANCE");
    }

    #[tokio::test]
    async fn test_cancel_then_cancel_again_conflicts() {
        let (app, _, _) = test_app();
        let (_, placed) = send(
            app.clone(),
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"limit","amount":"1","price":"50000"}"#,
            ),
        )
        .await;
        let id = placed["orderId"].as_str().unwrap().to_string();

        let del = |id: &str| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/orders/{id}"))
                .body(Body::empty())
                .unwrap()
        };

        let (status, json) = send(app.clone(), del(&id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "failed");

        let (status, json) = send(app, del(&id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "ALREADY_TERMINAL");
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app,
            get("/api/orders/018e0000-0000-7000-8000-000000000000"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_order_book_uses_dash_separated_symbols() {
        let (app, _, _) = test_app();
        send(
            app.clone(),
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"limit","amount":"1","price":"50000"}"#,
            ),
        )
        .await;

        let (status, json) = send(app, get("/api/markets/BTC-USD/book")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["symbol"], "BTC/USD");
        assert_eq!(json["bids"].as_array().unwrap().len(), 1);
        assert_eq!(json["bids"][0]["price"], "50000");
    }

    #[tokio::test]
    async fn test_wallet_validate_fails_closed() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app.clone(),
            get("/api/wallet/validate?asset=BTC&address=bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["valid"], true);

        let (_, json) = send(app, get("/api/wallet/validate?asset=DOGE&address=whatever")).await;
        assert_eq!(json["valid"], false);
    }

    #[tokio::test]
    async fn test_wallet_send_returns_pending_with_hash() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app,
            post_json(
                "/api/wallet/send",
                r#"{"asset":"ETH","to":"0xde0B295669a9FD93d5F28D9Ec85E40f4cb697BAe","amount":"1"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["confirmations"], 0);
        assert!(json["hash"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_wallet_send_invalid_address_rejected() {
        let (app, _, _) = test_app();
        let (status, json) = send(
            app,
            post_json(
                "/api/wallet/send",
                r#"{"asset":"ETH","to":"not-an-address","amount":"1"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_deposit_address_is_deterministic() {
        let (app, _, _) = test_app();
        let body = r#"{"asset":"ETH"}"#;
        let (_, first) = send(app.clone(), post_json("/api/wallet/deposit-address", body)).await;
        let (_, second) = send(app, post_json("/api/wallet/deposit-address", body)).await;
        assert_eq!(first["address"], second["address"]);
        assert!(first["address"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_fiat_deposit_unreachable_rail_reports_failed() {
        let (app, account, ledger) = test_app();
        let (status, json) = send(
            app,
            post_json(
                "/api/fiat/deposit",
                r#"{"amount":"500","currency":"USD","paymentMethod":"card_visa"}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "failed");
        assert!(json["message"].as_str().unwrap().contains("unreachable"));
        assert!(json["transactionId"].is_string());
        // Failed deposit must not credit the ledger.
        assert_eq!(
            ledger.balance(account, "USD").available,
            Decimal::from(1_000_000)
        );
    }

    #[tokio::test]
    async fn test_balances_reflect_reservations() {
        let (app, _, _) = test_app();
        send(
            app.clone(),
            post_json(
                "/api/orders",
                r#"{"type":"buy","symbol":"BTC/USD","orderType":"limit","amount":"1","price":"50000"}"#,
            ),
        )
        .await;

        let (status, json) = send(app, get("/api/balances")).await;
        assert_eq!(status, StatusCode::OK);
        let usd = json
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["asset"] == "USD")
            .unwrap();
        assert_eq!(usd["reserved"], "50000");
        assert_eq!(usd["available"], "950000");
    }
}
