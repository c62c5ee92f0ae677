// JSON-RPC transport layer implementation
// This file implements the Ethereum JSON-RPC client used for read-only
// contract calls and chain metadata (eth_call, eth_blockNumber, eth_gasPrice)
//
// Numan Thabit 2025 Nov

use crate::errors::LedgerError;
use crate::metrics::{LEDGER_ERRORS, LEDGER_LATENCY};
use ethers::types::{Address, U256};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JsonRpc {
    http: Client,
    url: String,
    timeout: Duration,
    next_id: Arc<AtomicU64>,
}

impl JsonRpc {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            timeout,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// `eth_call` against the latest block; returns the raw ABI-encoded reply.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, LedgerError> {
        let params = json!([
            { "to": hex_address(to), "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);
        let raw: String = self.request("eth_call", params).await?;
        decode_hex_bytes(&raw)
    }

    pub async fn block_number(&self) -> Result<u64, LedgerError> {
        let raw: String = self.request("eth_blockNumber", json!([])).await?;
        u64::from_str_radix(strip_0x(&raw), 16)
            .map_err(|e| LedgerError::Decode(format!("block number {raw:?}: {e}")))
    }

    pub async fn gas_price(&self) -> Result<U256, LedgerError> {
        let raw: String = self.request("eth_gasPrice", json!([])).await?;
        U256::from_str_radix(strip_0x(&raw), 16)
            .map_err(|e| LedgerError::Decode(format!("gas price {raw:?}: {e}")))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let timer = LEDGER_LATENCY.with_label_values(&[method]).start_timer();
        let result = self.send(method, params).await;
        timer.observe_duration();
        if result.is_err() {
            LEDGER_ERRORS.with_label_values(&[method]).inc();
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;
        if !resp.status().is_success() {
            return Err(LedgerError::Provider(format!("{method}: http {}", resp.status())));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| self.transport_error(method, e))?;
        if let Some(err) = body.get("error") {
            return Err(LedgerError::Provider(format!("{method}: {err}")));
        }
        serde_json::from_value(body["result"].clone())
            .map_err(|e| LedgerError::Decode(format!("{method} result: {e}")))
    }

    fn transport_error(&self, method: &'static str, err: reqwest::Error) -> LedgerError {
        if err.is_timeout() {
            LedgerError::Timeout {
                method,
                after: self.timeout,
            }
        } else {
            LedgerError::Transport(format!("{method}: {err}"))
        }
    }
}

fn strip_0x(raw: &str) -> &str {
    raw.strip_prefix("0x").unwrap_or(raw)
}

fn hex_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

fn decode_hex_bytes(raw: &str) -> Result<Vec<u8>, LedgerError> {
    hex::decode(strip_0x(raw)).map_err(|e| LedgerError::Decode(format!("call result {raw:?}: {e}")))
}
