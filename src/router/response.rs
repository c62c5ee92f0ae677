// Quote response assembly
// Maps the selected route and chain metadata onto the classic quote payload
// the interface consumes
//
// Numan Thabit 2025 Nov

use crate::router::routes::{QuoteResult, Reserve, RouteLeg, TokenDescriptor};
use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{Serialize, Serializer};

/// Routing discriminator. Only synchronous on-chain pricing exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Routing {
    Classic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInRoute {
    pub address: String,
    pub chain_id: u64,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct V2Reserve {
    pub token: TokenInRoute,
    pub quotient: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct V2PoolInRoute {
    #[serde(rename = "type")]
    pub pool_type: &'static str,
    pub address: String,
    pub token_in: TokenInRoute,
    pub token_out: TokenInRoute,
    pub reserve0: V2Reserve,
    pub reserve1: V2Reserve,
    pub amount_in: String,
    pub amount_out: String,
}

/// Fields the interface expects but this engine never estimates are kept as
/// `None` and rendered as empty strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicQuoteData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub block_number: String,
    pub amount: String,
    #[serde(serialize_with = "empty_when_none")]
    pub amount_decimals: Option<String>,
    pub gas_price_wei: String,
    #[serde(serialize_with = "empty_when_none")]
    pub gas_use_estimate: Option<String>,
    #[serde(serialize_with = "empty_when_none")]
    pub gas_use_estimate_quote: Option<String>,
    #[serde(serialize_with = "empty_when_none")]
    pub gas_use_estimate_quote_decimals: Option<String>,
    #[serde(rename = "gasUseEstimateUSD", serialize_with = "empty_when_none")]
    pub gas_use_estimate_usd: Option<String>,
    pub quote: String,
    #[serde(serialize_with = "empty_when_none")]
    pub quote_decimals: Option<String>,
    #[serde(serialize_with = "empty_when_none")]
    pub quote_gas_adjusted: Option<String>,
    #[serde(serialize_with = "empty_when_none")]
    pub quote_gas_adjusted_decimals: Option<String>,
    pub route: Vec<Vec<V2PoolInRoute>>,
    #[serde(serialize_with = "empty_when_none")]
    pub route_string: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicQuoteResponse {
    pub routing: Routing,
    pub quote: ClassicQuoteData,
    pub all_quotes: Vec<serde_json::Value>,
}

fn empty_when_none<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

pub fn checksum(address: Address) -> String {
    to_checksum(&address, None)
}

fn token_in_route(token: &TokenDescriptor) -> TokenInRoute {
    TokenInRoute {
        address: checksum(token.address),
        chain_id: token.chain_id,
        symbol: token.symbol.clone(),
        decimals: token.decimals,
    }
}

fn reserve(reserve: &Reserve) -> V2Reserve {
    V2Reserve {
        token: token_in_route(&reserve.token),
        quotient: reserve.quotient.to_string(),
    }
}

fn pool_in_route(leg: &RouteLeg) -> V2PoolInRoute {
    V2PoolInRoute {
        pool_type: "v2-pool",
        address: checksum(leg.pool),
        token_in: token_in_route(&leg.token_in),
        token_out: token_in_route(&leg.token_out),
        reserve0: reserve(&leg.reserve0),
        reserve1: reserve(&leg.reserve1),
        amount_in: leg.amount_in.to_string(),
        amount_out: leg.amount_out.to_string(),
    }
}

pub struct QuoteResponseBuilder;

impl QuoteResponseBuilder {
    pub fn build(result: &QuoteResult) -> ClassicQuoteResponse {
        let legs = result.route.legs().iter().map(pool_in_route).collect();
        ClassicQuoteResponse {
            routing: Routing::Classic,
            quote: ClassicQuoteData {
                quote_id: None,
                request_id: None,
                block_number: result.block_number.to_string(),
                amount: result.amount_in.to_string(),
                amount_decimals: None,
                gas_price_wei: result.gas_price_wei.to_string(),
                gas_use_estimate: None,
                gas_use_estimate_quote: None,
                gas_use_estimate_quote_decimals: None,
                gas_use_estimate_usd: None,
                quote: result.amount_out.to_string(),
                quote_decimals: None,
                quote_gas_adjusted: None,
                quote_gas_adjusted_decimals: None,
                route: vec![legs],
                route_string: None,
            },
            all_quotes: Vec::new(),
        }
    }
}
