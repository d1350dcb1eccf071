//! Seeded fault injection at the journal seam.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use types::trade::Trade;

use matching_engine::{JournalFault, TradeJournal};

/// Journal that records every trade into a shared tape, then fails the
/// write with a seeded probability.
///
/// The tape always sees the trade: an injected fault models the journal
/// failure being surfaced to the submitter, not the fill being lost, so
/// invariant checks can still account for every executed trade.
pub struct FlakyJournal {
    tape: Arc<Mutex<Vec<Trade>>>,
    rng: ChaCha8Rng,
    /// Probability in [0, 1] that a write reports failure.
    failure_rate: f64,
}

impl FlakyJournal {
    pub fn new(tape: Arc<Mutex<Vec<Trade>>>, rng: ChaCha8Rng, failure_rate: f64) -> Self {
        assert!((0.0..=1.0).contains(&failure_rate));
        Self {
            tape,
            rng,
            failure_rate,
        }
    }
}

impl TradeJournal for FlakyJournal {
    fn record_trade(&mut self, trade: &Trade) -> Result<(), JournalFault> {
        self.tape.lock().unwrap().push(trade.clone());
        if self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate) {
            return Err(JournalFault("injected journal fault".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use types::ids::{AccountId, OrderId, Symbol};
    use types::numeric::{Price, Quantity};
    use types::order::Side;

    fn trade(seq: u64) -> Trade {
        Trade::new(
            seq,
            Symbol::new("BTC/USD"),
            OrderId::new(),
            OrderId::new(),
            AccountId::new(),
            AccountId::new(),
            Side::Buy,
            Price::from_u64(50_000),
            Quantity::from_str("1").unwrap(),
            Decimal::ZERO,
            Decimal::ZERO,
            0,
        )
    }

    #[test]
    fn test_tape_sees_trade_even_when_write_fails() {
        let tape = Arc::new(Mutex::new(Vec::new()));
        let mut journal = FlakyJournal::new(
            Arc::clone(&tape),
            ChaCha8Rng::seed_from_u64(7),
            1.0,
        );

        assert!(journal.record_trade(&trade(1)).is_err());
        assert_eq!(tape.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_rate_never_fails() {
        let tape = Arc::new(Mutex::new(Vec::new()));
        let mut journal =
            FlakyJournal::new(Arc::clone(&tape), ChaCha8Rng::seed_from_u64(7), 0.0);
        for seq in 1..=100 {
            assert!(journal.record_trade(&trade(seq)).is_ok());
        }
    }

    #[test]
    fn test_fault_pattern_is_seeded() {
        let run = |seed: u64| -> Vec<bool> {
            let tape = Arc::new(Mutex::new(Vec::new()));
            let mut journal =
                FlakyJournal::new(tape, ChaCha8Rng::seed_from_u64(seed), 0.05);
            (1..=200)
                .map(|seq| journal.record_trade(&trade(seq)).is_err())
                .collect()
        };
        assert_eq!(run(42), run(42));
    }
}
