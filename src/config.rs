// Configuration management module
// This file handles loading of service settings from environment variables
// and the per-chain exchange table (factory, router, bridge tokens) from YAML
//
// Numan Thabit 2025 Nov

use crate::errors::ConfigError;
use crate::router::routes::TokenDescriptor;
use anyhow::{Context, Result};
use ethers::types::Address;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_INFLIGHT: usize = 64;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 5_000;

pub const BASE_CHAIN_ID: u64 = 8453;
pub const BASE_GOERLI_CHAIN_ID: u64 = 84531;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP bind address, e.g. 0.0.0.0:8080
    pub listen_addr: Option<String>,
    /// YAML chain table; the built-in Base / Base Goerli table is used when unset
    pub chains_file: Option<String>,
    /// Per-chain RPC endpoint overrides keyed by chain id (RPC__8453=https://...)
    pub rpc: Option<HashMap<String, Url>>,
    /// Concurrency control
    pub max_inflight: Option<usize>,
    /// Caller-level deadline for a whole quote request
    pub request_timeout_ms: Option<u64>,
    /// Deadline for each JSON-RPC call
    pub ledger_timeout_ms: Option<u64>,
    /// Price candidates concurrently instead of one after another
    pub concurrent_pricing: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let raw = self.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR);
        raw.parse()
            .with_context(|| format!("invalid listen address: {raw}"))
    }

    pub fn max_inflight(&self) -> usize {
        self.max_inflight.unwrap_or(DEFAULT_MAX_INFLIGHT).max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    pub fn ledger_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger_timeout_ms.unwrap_or(DEFAULT_LEDGER_TIMEOUT_MS))
    }

    pub fn concurrent_pricing(&self) -> bool {
        self.concurrent_pricing.unwrap_or(false)
    }

    /// Build the validated chain registry from the configured table plus RPC overrides.
    pub fn chain_registry(&self) -> Result<ChainRegistry> {
        let entries = match &self.chains_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("read chains file {path}"))?;
                let file: ChainFile = serde_yaml::from_str(&raw)
                    .with_context(|| format!("parse chains file {path}"))?;
                file.chains
            }
            None => builtin_chains(),
        };

        let overrides = self
            .rpc
            .iter()
            .flatten()
            .map(|(key, url)| {
                key.parse::<u64>()
                    .map(|chain_id| (chain_id, url.clone()))
                    .map_err(|_| ConfigError::InvalidRpcOverride(key.clone()))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(ChainRegistry::from_entries(entries, &overrides)?)
    }
}

/// On-disk chain table.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainFile {
    pub chains: Vec<ChainEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    /// Uniswap-V2 style factory (getPair)
    pub factory: String,
    /// Uniswap-V2 style router (getAmountsOut)
    pub router: String,
    /// Batch pair lookup helper (getPairAddresses), optional
    pub pair_reader: Option<String>,
    /// Alias clients send for the chain's native currency, e.g. ETH
    pub native_symbol: String,
    pub wrapped_native: TokenEntry,
    /// Intermediate tokens, highest priority first
    #[serde(default)]
    pub bridge_tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Validated, immutable settings for one chain.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: Url,
    pub factory: Address,
    pub router: Address,
    pub pair_reader: Option<Address>,
    pub native_symbol: String,
    pub wrapped_native: TokenDescriptor,
    pub bridge_tokens: Vec<TokenDescriptor>,
}

impl ChainSettings {
    fn from_entry(entry: ChainEntry, rpc_override: Option<&Url>) -> Result<Self, ConfigError> {
        let chain_id = entry.chain_id;
        let rpc_url = match rpc_override {
            Some(url) => url.clone(),
            None => Url::parse(&entry.rpc_url).map_err(|_| ConfigError::InvalidRpcUrl {
                chain_id,
                value: entry.rpc_url.clone(),
            })?,
        };
        let factory = parse_nonzero(chain_id, "factory", &entry.factory)?;
        let router = parse_nonzero(chain_id, "router", &entry.router)?;
        let pair_reader = entry
            .pair_reader
            .as_deref()
            .map(|raw| parse_nonzero(chain_id, "pair_reader", raw))
            .transpose()?;
        let wrapped_native = token_from_entry(chain_id, "wrapped_native", &entry.wrapped_native)?;

        let mut seen = HashSet::new();
        let mut bridge_tokens = Vec::with_capacity(entry.bridge_tokens.len());
        for raw in &entry.bridge_tokens {
            let token = token_from_entry(chain_id, "bridge_token", raw)?;
            if !seen.insert(token.address) {
                return Err(ConfigError::DuplicateBridge {
                    chain_id,
                    address: raw.address.clone(),
                });
            }
            bridge_tokens.push(token);
        }

        Ok(Self {
            chain_id,
            name: entry.name,
            rpc_url,
            factory,
            router,
            pair_reader,
            native_symbol: entry.native_symbol,
            wrapped_native,
            bridge_tokens,
        })
    }

    /// True when `raw` names the native currency rather than an ERC-20 address.
    pub fn is_native_alias(&self, raw: &str) -> bool {
        raw.eq_ignore_ascii_case("NATIVE") || raw.eq_ignore_ascii_case(&self.native_symbol)
    }
}

fn parse_address(chain_id: u64, field: &'static str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| ConfigError::InvalidAddress {
            chain_id,
            field,
            value: raw.to_string(),
        })
}

fn parse_nonzero(chain_id: u64, field: &'static str, raw: &str) -> Result<Address, ConfigError> {
    let address = parse_address(chain_id, field, raw)?;
    if address.is_zero() {
        return Err(ConfigError::ZeroAddress { chain_id, field });
    }
    Ok(address)
}

fn token_from_entry(
    chain_id: u64,
    field: &'static str,
    entry: &TokenEntry,
) -> Result<TokenDescriptor, ConfigError> {
    let address = parse_nonzero(chain_id, field, &entry.address)?;
    Ok(TokenDescriptor::new(
        chain_id,
        address,
        entry.decimals,
        entry.symbol.clone(),
    ))
}

/// Process-wide chain table, read-only after startup.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, Arc<ChainSettings>>,
}

impl ChainRegistry {
    pub fn from_entries(
        entries: Vec<ChainEntry>,
        rpc_overrides: &HashMap<u64, Url>,
    ) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::Empty);
        }
        let mut chains = BTreeMap::new();
        for entry in entries {
            let chain_id = entry.chain_id;
            let settings = ChainSettings::from_entry(entry, rpc_overrides.get(&chain_id))?;
            if chains.insert(chain_id, Arc::new(settings)).is_some() {
                return Err(ConfigError::DuplicateChain(chain_id));
            }
        }
        Ok(Self { chains })
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_entries(builtin_chains(), &HashMap::new())
    }

    pub fn get(&self, chain_id: u64) -> Option<&Arc<ChainSettings>> {
        self.chains.get(&chain_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChainSettings>> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn token_entry(address: &str, symbol: &str, decimals: u8) -> TokenEntry {
    TokenEntry {
        address: address.to_string(),
        symbol: symbol.to_string(),
        decimals,
    }
}

/// Exchange deployments on Base and Base Goerli. Bridge priority: SHINY, then WETH.
pub fn builtin_chains() -> Vec<ChainEntry> {
    const WETH: &str = "0x4200000000000000000000000000000000000006";
    vec![
        ChainEntry {
            chain_id: BASE_CHAIN_ID,
            name: "base".to_string(),
            rpc_url: "https://mainnet.base.org".to_string(),
            factory: "0x40e383B4820F84d9D4887caC490FD7C37094874c".to_string(),
            router: "0xBe8758DA8d5aC48191Ea4367DE48f4E216aCA9F8".to_string(),
            pair_reader: Some("0x5e4be8Bc9637f0EAA1A755019e06A68ce081D58F".to_string()),
            native_symbol: "ETH".to_string(),
            wrapped_native: token_entry(WETH, "WETH", 18),
            bridge_tokens: vec![
                token_entry("0xbe49A5AeFB08cC5b84dBcB92B5aae6B78Dac3A8c", "SHINY", 18),
                token_entry(WETH, "WETH", 18),
            ],
        },
        ChainEntry {
            chain_id: BASE_GOERLI_CHAIN_ID,
            name: "base-goerli".to_string(),
            rpc_url: "https://goerli.base.org".to_string(),
            factory: "0x25688571dEd2d102053Ca0EFD382E87c00231A23".to_string(),
            router: "0xcF34aD93dcA3aa41871D8A794D51e1480b3a9677".to_string(),
            pair_reader: Some("0xbBB69e6428CeeBA9CE1DFE86c3B7b72ffE56BE64".to_string()),
            native_symbol: "ETH".to_string(),
            wrapped_native: token_entry(WETH, "WETH", 18),
            bridge_tokens: vec![
                token_entry("0x45F65264b6C254cFa23163849fAB4FC8CaFe143f", "SHINY", 18),
                token_entry(WETH, "WETH", 18),
            ],
        },
    ]
}
