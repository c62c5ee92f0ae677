// In-memory ledger for engine and API tests
// Pairs, reserves and token metadata are registered up front; getAmountsOut
// follows the constant-product formula with the 0.3% fee unless overridden
//
// Numan Thabit 2025 Nov

#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use v2_quoter::config::{ChainRegistry, BASE_CHAIN_ID};
use v2_quoter::control::AdmissionControl;
use v2_quoter::errors::LedgerError;
use v2_quoter::router::Router;
use v2_quoter::router::validation::QuoteRequestBody;
use v2_quoter::venues::ledger::{LedgerQuery, PairReserves, TokenMetadata};

pub const USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
pub const DAI: &str = "0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb";
pub const WETH: &str = "0x4200000000000000000000000000000000000006";
pub const SHINY: &str = "0xbe49A5AeFB08cC5b84dBcB92B5aae6B78Dac3A8c";

pub const BLOCK_NUMBER: u64 = 12_345_678;
pub const GAS_PRICE_WEI: u64 = 1_500_000;

pub fn addr(raw: &str) -> Address {
    raw.parse().unwrap()
}

/// Uniswap-V2 `getAmountOut`.
pub fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> U256 {
    let with_fee = amount_in * U256::from(997u64);
    with_fee * reserve_out / (reserve_in * U256::from(1000u64) + with_fee)
}

fn key(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pool {
    address: Address,
    token0: Address,
    reserve0: U256,
    reserve1: U256,
}

#[derive(Default)]
pub struct MockLedger {
    pools: HashMap<(Address, Address), Pool>,
    metadata: HashMap<Address, TokenMetadata>,
    amounts_override: HashMap<Vec<Address>, Vec<U256>>,
    failing: Mutex<Option<&'static str>>,
    latency: Option<Duration>,
    pair_latency: HashMap<(Address, Address), Duration>,
    calls: AtomicUsize,
    calls_by_method: Mutex<HashMap<&'static str, usize>>,
    amounts_calls: AtomicUsize,
}

impl MockLedger {
    /// USDC, DAI, WETH and SHINY registered with their metadata, no pairs.
    pub fn base_tokens() -> Self {
        Self::default()
            .with_token(USDC, "USDC", 6)
            .with_token(DAI, "DAI", 18)
            .with_token(WETH, "WETH", 18)
            .with_token(SHINY, "SHINY", 18)
    }

    pub fn with_token(mut self, token: &str, symbol: &str, decimals: u8) -> Self {
        self.metadata.insert(
            addr(token),
            TokenMetadata {
                symbol: symbol.to_string(),
                decimals,
            },
        );
        self
    }

    /// Register a pair with `reserve_a` of `token_a` and `reserve_b` of `token_b`.
    /// `token0` is the lower address, as the factory sorts them.
    pub fn with_pair(
        mut self,
        token_a: &str,
        token_b: &str,
        pool: Address,
        reserve_a: u128,
        reserve_b: u128,
    ) -> Self {
        let (a, b) = (addr(token_a), addr(token_b));
        let (reserve0, reserve1) = if a < b {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        self.pools.insert(
            key(a, b),
            Pool {
                address: pool,
                token0: a.min(b),
                reserve0: U256::from(reserve0),
                reserve1: U256::from(reserve1),
            },
        );
        self
    }

    /// Fixed `getAmountsOut` reply for `path`.
    pub fn with_amounts(mut self, path: &[&str], amounts: &[u128]) -> Self {
        self.amounts_override.insert(
            path.iter().map(|t| addr(t)).collect(),
            amounts.iter().map(|a| U256::from(*a)).collect(),
        );
        self
    }

    /// Delay every pair lookup by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay lookups of one pair only, overriding `with_latency` for it.
    pub fn with_pair_latency(mut self, token_a: &str, token_b: &str, latency: Duration) -> Self {
        self.pair_latency
            .insert(key(addr(token_a), addr(token_b)), latency);
        self
    }

    /// Make every call to `method` fail with a transport error.
    pub fn fail(&self, method: &'static str) {
        *self.failing.lock().unwrap() = Some(method);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls_by_method
            .lock()
            .unwrap()
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn amounts_calls(&self) -> usize {
        self.amounts_calls.load(Ordering::SeqCst)
    }

    fn enter(&self, method: &'static str) -> Result<(), LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.calls_by_method.lock().unwrap().entry(method).or_default() += 1;
        if *self.failing.lock().unwrap() == Some(method) {
            return Err(LedgerError::Transport(format!("{method}: connection refused")));
        }
        Ok(())
    }

    fn pool_at(&self, pool: Address) -> Result<&Pool, LedgerError> {
        self.pools
            .values()
            .find(|p| p.address == pool)
            .ok_or_else(|| LedgerError::Decode(format!("no contract at {pool:?}")))
    }

    fn simulate(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, LedgerError> {
        let mut amounts = vec![amount_in];
        for hop in path.windows(2) {
            let pool = self
                .pools
                .get(&key(hop[0], hop[1]))
                .ok_or_else(|| LedgerError::Provider("execution reverted".to_string()))?;
            let (reserve_in, reserve_out) = if pool.token0 == hop[0] {
                (pool.reserve0, pool.reserve1)
            } else {
                (pool.reserve1, pool.reserve0)
            };
            let last = *amounts.last().unwrap();
            amounts.push(amount_out(last, reserve_in, reserve_out));
        }
        Ok(amounts)
    }

    /// Expected output of `path`, for assertions.
    pub fn expected_out(&self, amount_in: u128, path: &[&str]) -> U256 {
        let path: Vec<Address> = path.iter().map(|t| addr(t)).collect();
        *self
            .simulate(U256::from(amount_in), &path)
            .unwrap()
            .last()
            .unwrap()
    }
}

#[async_trait]
impl LedgerQuery for MockLedger {
    async fn resolve_pair(
        &self,
        _factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, LedgerError> {
        self.enter("resolve_pair")?;
        let latency = self
            .pair_latency
            .get(&key(token_a, token_b))
            .copied()
            .or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self
            .pools
            .get(&key(token_a, token_b))
            .map(|p| p.address)
            .unwrap_or_else(Address::zero))
    }

    async fn get_reserves(&self, pool: Address) -> Result<PairReserves, LedgerError> {
        self.enter("get_reserves")?;
        let pool = self.pool_at(pool)?;
        Ok(PairReserves {
            reserve0: pool.reserve0,
            reserve1: pool.reserve1,
            block_timestamp_last: 1_700_000_000,
        })
    }

    async fn get_token0(&self, pool: Address) -> Result<Address, LedgerError> {
        self.enter("get_token0")?;
        Ok(self.pool_at(pool)?.token0)
    }

    async fn simulate_amounts_out(
        &self,
        _router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, LedgerError> {
        self.enter("simulate_amounts_out")?;
        self.amounts_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(amounts) = self.amounts_override.get(path) {
            return Ok(amounts.clone());
        }
        self.simulate(amount_in, path)
    }

    async fn get_token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        self.enter("get_token_metadata")?;
        self.metadata
            .get(&token)
            .cloned()
            .ok_or_else(|| LedgerError::Decode(format!("empty symbol() reply from {token:?}")))
    }

    async fn get_block_number(&self) -> Result<u64, LedgerError> {
        self.enter("get_block_number")?;
        Ok(BLOCK_NUMBER)
    }

    async fn get_gas_price_wei(&self) -> Result<U256, LedgerError> {
        self.enter("get_gas_price_wei")?;
        Ok(U256::from(GAS_PRICE_WEI))
    }
}

/// Router over the built-in chain table with every chain backed by `ledger`.
pub fn router_with(ledger: Arc<MockLedger>) -> Router {
    router_with_admission(ledger, AdmissionControl::new(8, Duration::from_secs(5)))
}

pub fn router_with_admission(ledger: Arc<MockLedger>, admission: AdmissionControl) -> Router {
    Router::new(ChainRegistry::builtin().unwrap(), admission, |_| {
        Ok::<_, Infallible>(Arc::clone(&ledger) as Arc<dyn LedgerQuery>)
    })
    .unwrap()
}

pub fn quote_body(token_in: &str, token_out: &str, amount: &str) -> QuoteRequestBody {
    QuoteRequestBody {
        token_in: Some(token_in.to_string()),
        token_out: Some(token_out.to_string()),
        token_in_chain_id: Some(BASE_CHAIN_ID),
        token_out_chain_id: Some(BASE_CHAIN_ID),
        amount: Some(amount.to_string()),
        trade_type: Some("EXACT_INPUT".to_string()),
    }
}
