use crate::rate_limit::RateLimiter;
use matching_engine::Exchange;
use std::sync::Arc;
use types::ids::AccountId;
use wallet::{FiatGateway, TransferService};

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<Exchange>,
    pub transfers: Arc<TransferService>,
    pub fiat: Arc<FiatGateway>,
    pub rate_limiter: Arc<RateLimiter>,
    /// The front-end is unauthenticated; all requests act on this account.
    pub demo_account: AccountId,
}

impl AppState {
    pub fn new(
        exchange: Arc<Exchange>,
        transfers: Arc<TransferService>,
        fiat: Arc<FiatGateway>,
        demo_account: AccountId,
    ) -> Self {
        Self {
            exchange,
            transfers,
            fiat,
            rate_limiter: Arc::new(RateLimiter::new()),
            demo_account,
        }
    }
}
