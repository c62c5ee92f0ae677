// Route types for constant-product quoting
// This file defines tokens, reserves, legs, candidate paths and priced routes
// shared by the candidate generator, the path pricer and the selector
//
// Numan Thabit 2025 Nov

use ethers::types::{Address, U256};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Longest path the engine prices: tokenIn, one bridge, tokenOut.
pub const MAX_PATH_TOKENS: usize = 3;

/// ERC-20 token as it appears inside a route.
///
/// Identity is `(chain_id, address)`; symbol and decimals are descriptive only.
#[derive(Debug, Clone)]
pub struct TokenDescriptor {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl TokenDescriptor {
    pub fn new(chain_id: u64, address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
        }
    }
}

impl PartialEq for TokenDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for TokenDescriptor {}

impl Hash for TokenDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for TokenDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.symbol, self.address)
    }
}

/// Raw pool reserve of one side of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reserve {
    pub token: TokenDescriptor,
    pub quotient: U256,
}

/// One hop through exactly one pair.
///
/// `reserve0`/`reserve1` follow the pair's own `token0` ordering, not the swap direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLeg {
    pub pool: Address,
    pub token_in: TokenDescriptor,
    pub token_out: TokenDescriptor,
    pub reserve0: Reserve,
    pub reserve1: Reserve,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Priced route of one or two legs where each leg consumes the previous leg's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    legs: Vec<RouteLeg>,
}

#[allow(clippy::len_without_is_empty)]
impl RoutePath {
    /// Returns `None` unless the legs form a chained path of 1..=2 hops.
    pub fn new(legs: Vec<RouteLeg>) -> Option<Self> {
        if legs.is_empty() || legs.len() > MAX_PATH_TOKENS - 1 {
            return None;
        }
        let chained = legs.windows(2).all(|pair| {
            pair[0].amount_out == pair[1].amount_in && pair[0].token_out == pair[1].token_in
        });
        chained.then_some(Self { legs })
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn amount_in(&self) -> U256 {
        self.legs[0].amount_in
    }

    pub fn amount_out(&self) -> U256 {
        self.legs[self.legs.len() - 1].amount_out
    }

    pub fn is_direct(&self) -> bool {
        self.legs.len() == 1
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.legs[0].token_in.symbol)?;
        for leg in &self.legs {
            write!(f, " -> {}", leg.token_out.symbol)?;
        }
        Ok(())
    }
}

/// Ordered token sequence considered for pricing before feasibility is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    tokens: Vec<TokenDescriptor>,
}

impl CandidatePath {
    pub fn direct(token_in: TokenDescriptor, token_out: TokenDescriptor) -> Self {
        Self {
            tokens: vec![token_in, token_out],
        }
    }

    pub fn bridged(
        token_in: TokenDescriptor,
        bridge: TokenDescriptor,
        token_out: TokenDescriptor,
    ) -> Self {
        Self {
            tokens: vec![token_in, bridge, token_out],
        }
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|t| t.address).collect()
    }

    /// Bridge token for a two-hop candidate.
    pub fn bridge(&self) -> Option<&TokenDescriptor> {
        (self.tokens.len() == 3).then(|| &self.tokens[1])
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.tokens.iter().map(|t| t.symbol.as_str()).collect();
        write!(f, "{}", symbols.join(" -> "))
    }
}

/// Result of pricing one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricedCandidate {
    Feasible(RoutePath),
    /// A hop has no pair deployed; not an error.
    Infeasible { token_a: Address, token_b: Address },
}

impl PricedCandidate {
    pub fn into_route(self) -> Option<RoutePath> {
        match self {
            Self::Feasible(route) => Some(route),
            Self::Infeasible { .. } => None,
        }
    }
}

/// Winning route plus the informational chain metadata fetched after selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResult {
    pub route: RoutePath,
    pub amount_in: U256,
    pub amount_out: U256,
    pub block_number: u64,
    pub gas_price_wei: U256,
}
