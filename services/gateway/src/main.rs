mod error;
mod handlers;
mod journal;
mod models;
mod rate_limit;
mod router;
mod state;

use journal::DurableJournal;
use ledger::Ledger;
use matching_engine::{Exchange, FeeSchedule};
use persistence::{JournalConfig, RecoveryEngine};
use router::create_router;
use rust_decimal::Decimal;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::ids::{AccountId, Symbol};
use wallet::{FiatGateway, SimulatedNetwork, StaticFeeSchedule, TransferService, UnreachableRail};

const MARKETS: &[&str] = &["BTC/USD", "ETH/USD", "BTC/USDT", "ETH/USDT"];

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting exchange gateway");

    let journal_dir =
        std::env::var("JOURNAL_DIR").unwrap_or_else(|_| "./journal".to_string());

    // Replay the trade log so the engine resumes its sequence gapless.
    let (recovered, metrics) = RecoveryEngine::new(&journal_dir).recover()?;
    tracing::info!(
        replayed = metrics.replay_count,
        elapsed_ms = metrics.replay_time_ms,
        next_sequence = recovered.next_sequence,
        "journal recovery complete"
    );

    let journal = DurableJournal::open(
        JournalConfig::new(&journal_dir),
        recovered.next_sequence,
    )?;

    let ledger = Arc::new(Ledger::new());
    let demo_account = AccountId::new();
    seed_demo_balances(&ledger, demo_account);

    let exchange = Arc::new(Exchange::new(
        Arc::clone(&ledger),
        MARKETS.iter().map(|s| Symbol::new(*s)),
        Box::new(journal),
        FeeSchedule::default(),
        recovered.next_sequence,
    ));
    let transfers = Arc::new(TransferService::new(
        Arc::clone(&ledger),
        Box::<StaticFeeSchedule>::default(),
        Box::new(SimulatedNetwork),
    ));
    // No rail is wired up in this deployment; fiat requests report failed
    // with an explanatory message instead of pretending to settle.
    let fiat = Arc::new(FiatGateway::new(Arc::clone(&ledger), Box::new(UnreachableRail)));

    let app = create_router(AppState::new(exchange, transfers, fiat, demo_account));

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, account = %demo_account, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// The front-end is a demo with no signup flow; give its single account
/// something to trade with.
fn seed_demo_balances(ledger: &Ledger, account: AccountId) {
    ledger.deposit(account, "USD", Decimal::from(100_000));
    ledger.deposit(account, "USDT", Decimal::from(50_000));
    ledger.deposit(account, "BTC", Decimal::from(2));
    ledger.deposit(account, "ETH", Decimal::from(25));
}
