// Venues
// Ledger query interface and its constant-product AMM implementation
//
// Numan Thabit 2025 Nov

pub mod ledger;
pub mod uniswap_v2;

pub use ledger::{LedgerQuery, PairReserves, TokenMetadata};
pub use uniswap_v2::EvmLedger;
