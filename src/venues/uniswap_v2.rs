// Uniswap-V2 style ledger adapter
// This file implements the ledger query interface on top of JSON-RPC eth_call,
// ABI-encoding factory, router, pair, ERC-20 and pair-reader view functions
//
// Numan Thabit 2025 Nov

use crate::errors::LedgerError;
use crate::transport::jsonrpc::JsonRpc;
use crate::venues::ledger::{resolve_each, LedgerQuery, PairReserves, TokenMetadata};
use async_trait::async_trait;
use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, U256};
use ethers::utils::id;
use tracing::debug;

const GET_PAIR: &str = "getPair(address,address)";
const GET_RESERVES: &str = "getReserves()";
const TOKEN0: &str = "token0()";
const GET_AMOUNTS_OUT: &str = "getAmountsOut(uint256,address[])";
const SYMBOL: &str = "symbol()";
const DECIMALS: &str = "decimals()";
const GET_PAIR_ADDRESSES: &str = "getPairAddresses(address,address[][])";

/// Ledger reads against one chain's JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct EvmLedger {
    rpc: JsonRpc,
}

impl EvmLedger {
    pub fn new(rpc: JsonRpc) -> Self {
        Self { rpc }
    }

    async fn call(
        &self,
        to: Address,
        signature: &'static str,
        args: &[Token],
        outputs: &[ParamType],
    ) -> Result<Vec<Token>, LedgerError> {
        let reply = self.rpc.eth_call(to, &encode_call(signature, args)).await?;
        abi::decode(outputs, &reply)
            .map_err(|e| LedgerError::Decode(format!("{signature} on {to:?}: {e}")))
    }
}

pub(crate) fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = id(signature).to_vec();
    data.extend(abi::encode(args));
    data
}

fn single(signature: &str, tokens: Vec<Token>) -> Result<Token, LedgerError> {
    tokens
        .into_iter()
        .next()
        .ok_or_else(|| LedgerError::Decode(format!("{signature}: empty reply")))
}

fn as_address(signature: &str, token: Token) -> Result<Address, LedgerError> {
    token
        .into_address()
        .ok_or_else(|| LedgerError::Decode(format!("{signature}: expected address")))
}

fn as_uint(signature: &str, token: Token) -> Result<U256, LedgerError> {
    token
        .into_uint()
        .ok_or_else(|| LedgerError::Decode(format!("{signature}: expected uint")))
}

fn as_array(signature: &str, token: Token) -> Result<Vec<Token>, LedgerError> {
    token
        .into_array()
        .ok_or_else(|| LedgerError::Decode(format!("{signature}: expected array")))
}

#[async_trait]
impl LedgerQuery for EvmLedger {
    async fn resolve_pair(
        &self,
        factory: Address,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, LedgerError> {
        let out = self
            .call(
                factory,
                GET_PAIR,
                &[Token::Address(token_a), Token::Address(token_b)],
                &[ParamType::Address],
            )
            .await?;
        let pair = as_address(GET_PAIR, single(GET_PAIR, out)?)?;
        debug!(token_a = ?token_a, token_b = ?token_b, pair = ?pair, "resolved pair");
        Ok(pair)
    }

    async fn get_reserves(&self, pool: Address) -> Result<PairReserves, LedgerError> {
        let out = self
            .call(
                pool,
                GET_RESERVES,
                &[],
                &[ParamType::Uint(112), ParamType::Uint(112), ParamType::Uint(32)],
            )
            .await?;
        let mut it = out.into_iter();
        let mut next = || {
            it.next()
                .ok_or_else(|| LedgerError::Decode(format!("{GET_RESERVES}: short reply")))
                .and_then(|t| as_uint(GET_RESERVES, t))
        };
        let reserve0 = next()?;
        let reserve1 = next()?;
        let block_timestamp_last = next()?.low_u32();
        Ok(PairReserves {
            reserve0,
            reserve1,
            block_timestamp_last,
        })
    }

    async fn get_token0(&self, pool: Address) -> Result<Address, LedgerError> {
        let out = self.call(pool, TOKEN0, &[], &[ParamType::Address]).await?;
        as_address(TOKEN0, single(TOKEN0, out)?)
    }

    async fn simulate_amounts_out(
        &self,
        router: Address,
        amount_in: U256,
        path: &[Address],
    ) -> Result<Vec<U256>, LedgerError> {
        let path_tokens = path.iter().copied().map(Token::Address).collect();
        let out = self
            .call(
                router,
                GET_AMOUNTS_OUT,
                &[Token::Uint(amount_in), Token::Array(path_tokens)],
                &[ParamType::Array(Box::new(ParamType::Uint(256)))],
            )
            .await?;
        as_array(GET_AMOUNTS_OUT, single(GET_AMOUNTS_OUT, out)?)?
            .into_iter()
            .map(|t| as_uint(GET_AMOUNTS_OUT, t))
            .collect()
    }

    async fn get_token_metadata(&self, token: Address) -> Result<TokenMetadata, LedgerError> {
        let symbol = self.call(token, SYMBOL, &[], &[ParamType::String]).await?;
        let symbol = single(SYMBOL, symbol)?
            .into_string()
            .ok_or_else(|| LedgerError::Decode(format!("{SYMBOL}: expected string")))?;
        let decimals = self.call(token, DECIMALS, &[], &[ParamType::Uint(8)]).await?;
        let decimals = as_uint(DECIMALS, single(DECIMALS, decimals)?)?;
        if decimals > U256::from(u8::MAX) {
            return Err(LedgerError::Decode(format!("{DECIMALS}: {decimals} out of range")));
        }
        Ok(TokenMetadata {
            symbol,
            decimals: decimals.low_u32() as u8,
        })
    }

    async fn get_block_number(&self) -> Result<u64, LedgerError> {
        self.rpc.block_number().await
    }

    async fn get_gas_price_wei(&self) -> Result<U256, LedgerError> {
        self.rpc.gas_price().await
    }

    async fn resolve_pairs(
        &self,
        factory: Address,
        reader: Option<Address>,
        pairs: &[(Address, Address)],
    ) -> Result<Vec<Address>, LedgerError> {
        let Some(reader) = reader else {
            return resolve_each(self, factory, pairs).await;
        };

        let tokens = pairs
            .iter()
            .map(|(a, b)| Token::Array(vec![Token::Address(*a), Token::Address(*b)]))
            .collect();
        let out = self
            .call(
                reader,
                GET_PAIR_ADDRESSES,
                &[Token::Address(factory), Token::Array(tokens)],
                &[ParamType::Array(Box::new(ParamType::Address))],
            )
            .await?;
        let addresses = as_array(GET_PAIR_ADDRESSES, single(GET_PAIR_ADDRESSES, out)?)?
            .into_iter()
            .map(|t| as_address(GET_PAIR_ADDRESSES, t))
            .collect::<Result<Vec<_>, _>>()?;
        if addresses.len() != pairs.len() {
            return Err(LedgerError::Decode(format!(
                "{GET_PAIR_ADDRESSES}: {} addresses for {} pairs",
                addresses.len(),
                pairs.len()
            )));
        }
        Ok(addresses)
    }
}
