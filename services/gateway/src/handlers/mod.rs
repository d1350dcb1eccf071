pub mod fiat;
pub mod market;
pub mod order;
pub mod wallet;
