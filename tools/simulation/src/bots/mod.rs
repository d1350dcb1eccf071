pub mod market_maker;
pub mod taker;

pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use taker::{Taker, TakerConfig};

use matching_engine::ExecutionReport;
use types::errors::ExchangeError;

/// What one bot tick did to the exchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickOutcome {
    pub submitted: usize,
    pub rejected: usize,
    pub journal_faults: usize,
}

impl TickOutcome {
    /// Classify one submission result. A journal fault still means the
    /// order executed; only validation and balance errors are rejections.
    pub fn absorb(&mut self, result: &Result<ExecutionReport, ExchangeError>) {
        match result {
            Ok(_) => self.submitted += 1,
            Err(ExchangeError::Journal(_)) => {
                self.submitted += 1;
                self.journal_faults += 1;
            }
            Err(_) => self.rejected += 1,
        }
    }

    pub fn merge(&mut self, other: TickOutcome) {
        self.submitted += other.submitted;
        self.rejected += other.rejected;
        self.journal_faults += other.journal_faults;
    }
}
