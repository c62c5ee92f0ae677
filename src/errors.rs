// Error types and error handling module
// This file defines the quote error taxonomy and the ledger error kinds
// that surface when on-chain reads fail
//
// Numan Thabit 2025 Nov

use std::time::Duration;
use thiserror::Error;

/// Failure of a single read against the ledger (JSON-RPC node).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{method} timed out after {after:?}")]
    Timeout { method: &'static str, after: Duration },
}

/// Outcome kinds of a quote request that did not produce a quote.
///
/// `InvalidRequest` and `NoRouteFound` are both answered with 400 on the wire,
/// but callers and metrics keep them apart.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no route exists")]
    NoRouteFound,
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),
}

impl QuoteError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    /// Label used for the quote outcome counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::NoRouteFound => "no_route",
            Self::LedgerUnavailable(_) => "ledger_unavailable",
        }
    }
}

/// Chain table problems detected while building the registry at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("chain {chain_id}: invalid {field} address {value:?}")]
    InvalidAddress {
        chain_id: u64,
        field: &'static str,
        value: String,
    },
    #[error("chain {chain_id}: {field} must not be the zero address")]
    ZeroAddress { chain_id: u64, field: &'static str },
    #[error("chain {chain_id}: invalid rpc url {value:?}")]
    InvalidRpcUrl { chain_id: u64, value: String },
    #[error("chain {0} is configured more than once")]
    DuplicateChain(u64),
    #[error("chain {chain_id}: bridge token {address} listed more than once")]
    DuplicateBridge { chain_id: u64, address: String },
    #[error("rpc override for {0:?} does not name a numeric chain id")]
    InvalidRpcOverride(String),
    #[error("no chains configured")]
    Empty,
}
