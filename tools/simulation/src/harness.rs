//! Simulation harness wiring bots, exchange, and invariant checks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use types::ids::{AccountId, Symbol};
use types::numeric::Quantity;
use types::order::Side;
use types::trade::Trade;

use crate::bots::{MarketMaker, MarketMakerConfig, Taker, TakerConfig, TickOutcome};
use crate::faults::FlakyJournal;
use ledger::Ledger;
use matching_engine::{Exchange, FeeSchedule};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u64,
    pub ticks: u32,
    pub symbols: Vec<Symbol>,
    /// Taker bots sharing the configured markets.
    pub takers: usize,
    /// Injected journal failure probability per trade write.
    pub journal_failure_rate: f64,
    pub fees: FeeSchedule,
    pub reference_price: Decimal,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 500,
            symbols: vec![Symbol::new("BTC/USD"), Symbol::new("ETH/USD")],
            takers: 4,
            journal_failure_rate: 0.0,
            fees: FeeSchedule::default(),
            reference_price: Decimal::from(50_000),
        }
    }
}

/// Outcome of one simulation run.
#[derive(Debug, Serialize)]
pub struct SimReport {
    pub seed: u64,
    pub ticks: u32,
    pub orders_submitted: usize,
    pub orders_rejected: usize,
    pub journal_faults: usize,
    pub trades_executed: usize,
    /// Fees collected per asset across the run.
    pub fees: BTreeMap<String, Decimal>,
    pub final_sequence: u64,
}

pub struct Simulation {
    config: SimConfig,
    ledger: Arc<Ledger>,
    exchange: Exchange,
    tape: Arc<Mutex<Vec<Trade>>>,
    makers: Vec<MarketMaker>,
    takers: Vec<Taker>,
    accounts: Vec<AccountId>,
    /// Total deposited per asset, the conservation baseline.
    initial: BTreeMap<String, Decimal>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let mut master = ChaCha8Rng::seed_from_u64(config.seed);
        let ledger = Arc::new(Ledger::new());
        let tape = Arc::new(Mutex::new(Vec::new()));

        let journal = FlakyJournal::new(
            Arc::clone(&tape),
            ChaCha8Rng::seed_from_u64(master.gen()),
            config.journal_failure_rate,
        );
        let exchange = Exchange::new(
            Arc::clone(&ledger),
            config.symbols.iter().cloned(),
            Box::new(journal),
            config.fees,
            1,
        );

        let mut accounts = Vec::new();
        let mut initial: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut fund = |ledger: &Ledger,
                        initial: &mut BTreeMap<String, Decimal>,
                        account: AccountId| {
            for symbol in &config.symbols {
                let base_amount = Decimal::from(10_000);
                let quote_amount = Decimal::from(500_000_000);
                ledger.deposit(account, symbol.base(), base_amount);
                ledger.deposit(account, symbol.quote(), quote_amount);
                *initial.entry(symbol.base().to_string()).or_default() += base_amount;
                *initial.entry(symbol.quote().to_string()).or_default() += quote_amount;
            }
        };

        let makers = config
            .symbols
            .iter()
            .map(|symbol| {
                let account = AccountId::new();
                fund(&ledger, &mut initial, account);
                accounts.push(account);
                MarketMaker::new(
                    account,
                    symbol.clone(),
                    MarketMakerConfig {
                        reference_price: config.reference_price,
                        max_inventory: Decimal::from(1_000),
                        ..MarketMakerConfig::default()
                    },
                    ChaCha8Rng::seed_from_u64(master.gen()),
                )
            })
            .collect();

        let takers = (0..config.takers)
            .map(|_| {
                let account = AccountId::new();
                fund(&ledger, &mut initial, account);
                accounts.push(account);
                Taker::new(
                    account,
                    TakerConfig {
                        symbols: config.symbols.clone(),
                        order_size: Quantity::from_str("1").unwrap(),
                        market_ratio: 0.3,
                        reference_price: config.reference_price,
                    },
                    ChaCha8Rng::seed_from_u64(master.gen()),
                )
            })
            .collect();

        Self {
            config,
            ledger,
            exchange,
            tape,
            makers,
            takers,
            accounts,
            initial,
        }
    }

    /// Run the configured number of ticks, then verify invariants.
    ///
    /// # Panics
    /// Panics if any conservation or sequencing invariant is violated.
    pub fn run(&mut self) -> SimReport {
        let mut outcome = TickOutcome::default();

        for tick in 0..self.config.ticks {
            for maker in &mut self.makers {
                outcome.merge(maker.tick(&self.exchange));
            }
            for taker in &mut self.takers {
                outcome.merge(taker.tick(&self.exchange));
            }
            if tick % 100 == 0 {
                tracing::debug!(tick, submitted = outcome.submitted, "simulation progress");
            }
        }

        let trades = self.trades();
        self.verify_invariants(&trades);

        let fees = Self::fees_by_asset(&trades);
        SimReport {
            seed: self.config.seed,
            ticks: self.config.ticks,
            orders_submitted: outcome.submitted,
            orders_rejected: outcome.rejected,
            journal_faults: outcome.journal_faults,
            trades_executed: trades.len(),
            fees,
            final_sequence: trades.last().map(|t| t.sequence).unwrap_or(0),
        }
    }

    /// The executed trade tape, in sequence order.
    pub fn trades(&self) -> Vec<Trade> {
        let mut trades = self.tape.lock().unwrap().clone();
        trades.sort_by_key(|t| t.sequence);
        trades
    }

    fn fees_by_asset(trades: &[Trade]) -> BTreeMap<String, Decimal> {
        let mut fees: BTreeMap<String, Decimal> = BTreeMap::new();
        for trade in trades {
            // The taker pays in the asset it receives; the maker likewise.
            let (base_fee, quote_fee) = match trade.taker_side {
                Side::Buy => (trade.taker_fee, trade.maker_fee),
                Side::Sell => (trade.maker_fee, trade.taker_fee),
            };
            *fees.entry(trade.symbol.base().to_string()).or_default() += base_fee;
            *fees.entry(trade.symbol.quote().to_string()).or_default() += quote_fee;
        }
        fees
    }

    /// Conservation and sequencing checks over the finished run.
    fn verify_invariants(&self, trades: &[Trade]) {
        for (i, trade) in trades.iter().enumerate() {
            assert_eq!(
                trade.sequence,
                i as u64 + 1,
                "trade sequence must be gapless from 1"
            );
        }

        let fees = Self::fees_by_asset(trades);
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for account in &self.accounts {
            for (asset, balance) in self.ledger.balances_for(*account) {
                assert!(balance.available >= Decimal::ZERO, "negative available");
                assert!(balance.reserved >= Decimal::ZERO, "negative reserved");
                *totals.entry(asset).or_default() += balance.total();
            }
        }

        for (asset, initial) in &self.initial {
            let held = totals.get(asset).copied().unwrap_or_default();
            let collected = fees.get(asset).copied().unwrap_or_default();
            assert_eq!(
                held + collected,
                *initial,
                "conservation violated for {asset}: held {held} + fees {collected} != {initial}"
            );
        }
    }
}
