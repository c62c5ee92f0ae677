// Ledger query adapter
// This file defines the read-only interface the quote engine consumes
// to inspect constant-product pairs and chain metadata
//
// Numan Thabit 2025 Nov

use crate::errors::LedgerError;
use async_trait::async_trait;
use ethers::types::{Address, U256};

/// Raw `getReserves()` reply of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u32,
}

/// ERC-20 `symbol()` / `decimals()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// Read-only access to on-chain exchange state.
///
/// `resolve_pair` answers `Address::zero()` when no pair is deployed; every
/// other failure is a `LedgerError` and aborts the caller's request.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn resolve_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, LedgerError>;

    async fn get_reserves(&self, pool: Address) -> Result<PairReserves, LedgerError>;

    async fn get_token0(&self, pool: Address) -> Result<Address, LedgerError>;

    /// Router `getAmountsOut`: one amount per path token, the first being `amount_in`.
    async fn simulate_amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, LedgerError>;

    async fn get_token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError>;

    async fn get_block_number(&self) -> Result<u64, LedgerError>;

    async fn get_gas_price_wei(&self) -> Result<U256, LedgerError>;

    /// Batch pair lookup. Uses the pair-reader helper when one is deployed,
    /// otherwise one `resolve_pair` per entry, in order.
    async fn resolve_pairs(
        &self,
        factory: Address,
        _reader: Option<Address>,
        pairs: &[(Address, Address)],
    ) -> Result<Vec<Address>, LedgerError> {
        resolve_each(self, factory, pairs).await
    }
}

/// One `resolve_pair` per entry, in order; stops at the first failure.
pub async fn resolve_each<L: LedgerQuery + ?Sized>(
    ledger: &L,
    factory: Address,
    pairs: &[(Address, Address)],
) -> Result<Vec<Address>, LedgerError> {
    let mut out = Vec::with_capacity(pairs.len());
    for (token_a, token_b) in pairs {
        out.push(ledger.resolve_pair(factory, *token_a, *token_b).await?);
    }
    Ok(out)
}
