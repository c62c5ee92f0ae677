// Quote request validation module
// Validates the incoming quote request before any ledger query is issued
//
// Numan Thabit 2025 Nov

use crate::config::ChainRegistry;
use crate::errors::QuoteError;
use ethers::types::{Address, U256};
use serde::Deserialize;

/// Quote request as sent by the interface. Every field is optional here so
/// that missing fields surface as `InvalidRequest` instead of a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    pub token_in: Option<String>,
    pub token_out: Option<String>,
    pub token_in_chain_id: Option<u64>,
    pub token_out_chain_id: Option<u64>,
    pub amount: Option<String>,
    #[serde(rename = "type")]
    pub trade_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

impl TradeType {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "EXACT_INPUT" => Some(Self::ExactInput),
            "EXACT_OUTPUT" => Some(Self::ExactOutput),
            _ => None,
        }
    }
}

/// Token as requested, before native-currency substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedToken {
    Native,
    Erc20(Address),
}

/// Request that passed validation; the chain is known to be configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub chain_id: u64,
    pub token_in: RequestedToken,
    pub token_out: RequestedToken,
    pub amount: U256,
}

/// Validation result
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), QuoteError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(QuoteError::InvalidRequest(self.errors.join("; ")))
        }
    }
}

/// Validate a raw quote request against the configured chains.
pub fn validate_quote_request(
    body: &QuoteRequestBody,
    registry: &ChainRegistry,
) -> Result<QuoteRequest, QuoteError> {
    let mut result = ValidationResult::new();

    let chain = match body.token_in_chain_id {
        None => {
            result.add_error("missing tokenInChainId");
            None
        }
        Some(chain_id) => match registry.get(chain_id) {
            Some(chain) => Some(chain),
            None => {
                result.add_error(format!("unsupported chain {chain_id}"));
                None
            }
        },
    };
    if let (Some(chain), Some(out_chain)) = (chain, body.token_out_chain_id) {
        if out_chain != chain.chain_id {
            result.add_error(format!(
                "cross-chain quotes are not supported ({} -> {out_chain})",
                chain.chain_id
            ));
        }
    }

    let mut token = |field: &str, raw: &Option<String>| -> Option<RequestedToken> {
        let raw = match raw.as_deref().map(str::trim) {
            None | Some("") => {
                result.add_error(format!("missing {field}"));
                return None;
            }
            Some(raw) => raw,
        };
        let is_native = match chain {
            Some(chain) => chain.is_native_alias(raw),
            None => raw.eq_ignore_ascii_case("NATIVE"),
        };
        if is_native {
            return Some(RequestedToken::Native);
        }
        match parse_token_address(raw) {
            Some(address) => Some(RequestedToken::Erc20(address)),
            None => {
                result.add_error(format!("invalid {field} address {raw:?}"));
                None
            }
        }
    };
    let token_in = token("tokenIn", &body.token_in);
    let token_out = token("tokenOut", &body.token_out);

    let amount = match body.amount.as_deref().map(str::trim) {
        None | Some("") => {
            result.add_error("missing amount");
            None
        }
        Some(raw) => match parse_amount(raw) {
            Some(amount) => Some(amount),
            None => {
                result.add_error(format!("amount must be a positive integer, got {raw:?}"));
                None
            }
        },
    };

    match body.trade_type.as_deref().map(TradeType::parse) {
        None => result.add_error("missing type"),
        Some(None) => result.add_error(format!(
            "unknown type {:?}",
            body.trade_type.as_deref().unwrap_or_default()
        )),
        Some(Some(TradeType::ExactOutput)) => {
            result.add_error("EXACT_OUTPUT quotes are not supported")
        }
        Some(Some(TradeType::ExactInput)) => {}
    }

    result.into_result()?;

    match (chain, token_in, token_out, amount) {
        (Some(chain), Some(token_in), Some(token_out), Some(amount)) => Ok(QuoteRequest {
            chain_id: chain.chain_id,
            token_in,
            token_out,
            amount,
        }),
        _ => Err(QuoteError::invalid("incomplete request")),
    }
}

fn parse_token_address(raw: &str) -> Option<Address> {
    let hex = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if hex.len() != 40 {
        return None;
    }
    hex.parse::<Address>().ok()
}

/// Positive base-10 integer that fits a `uint256`.
fn parse_amount(raw: &str) -> Option<U256> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(raw).ok().filter(|amount| !amount.is_zero())
}
