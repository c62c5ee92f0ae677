// Router HTTP API implementation
// This file ties request validation to the per-chain quote engines and
// exposes them over HTTP
//
// Numan Thabit 2025 Nov

use crate::config::{ChainRegistry, ChainSettings};
use crate::control::{AdmissionControl, DeadlineExceeded};
use crate::errors::QuoteError;
use crate::metrics::{self, QUOTE_OUTCOMES};
use crate::router::engine::{QuoteEngine, QuoteStage};
use crate::router::response::{checksum, ClassicQuoteResponse, QuoteResponseBuilder};
use crate::router::routes::QuoteResult;
use crate::router::validation::{validate_quote_request, QuoteRequestBody};
use crate::venues::ledger::LedgerQuery;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// High-level Router that ties validation, per-chain engines and admission control together
pub struct Router {
    registry: ChainRegistry,
    engines: HashMap<u64, QuoteEngine>,
    admission: AdmissionControl,
}

impl Router {
    /// Build one engine per configured chain using `make_ledger` for its ledger handle.
    pub fn new<F, E>(
        registry: ChainRegistry,
        admission: AdmissionControl,
        mut make_ledger: F,
    ) -> Result<Self, E>
    where
        F: FnMut(&ChainSettings) -> Result<Arc<dyn LedgerQuery>, E>,
    {
        let mut engines = HashMap::with_capacity(registry.len());
        for chain in registry.iter() {
            let ledger = make_ledger(chain)?;
            engines.insert(chain.chain_id, QuoteEngine::new(Arc::clone(chain), ledger));
        }
        Ok(Self {
            registry,
            engines,
            admission,
        })
    }

    pub fn with_concurrent_pricing(mut self, enabled: bool) -> Self {
        self.engines = self
            .engines
            .into_iter()
            .map(|(id, engine)| (id, engine.with_concurrent_pricing(enabled)))
            .collect();
        self
    }

    /// Metrics label for a requested chain. Ids outside the registry collapse
    /// to fixed labels so clients cannot mint new series.
    pub fn chain_label(&self, chain_id: Option<u64>) -> String {
        match chain_id {
            None => "unknown".to_string(),
            Some(id) => self
                .registry
                .get(id)
                .map(|chain| chain.chain_id.to_string())
                .unwrap_or_else(|| "unsupported".to_string()),
        }
    }

    fn engine(&self, chain_id: u64) -> Result<&QuoteEngine, QuoteError> {
        self.engines
            .get(&chain_id)
            .ok_or_else(|| QuoteError::invalid(format!("unsupported chain {chain_id}")))
    }

    /// Validate and price a quote request. Nothing touches the ledger unless validation passes.
    pub async fn quote(&self, body: &QuoteRequestBody) -> Result<QuoteResult, QuoteError> {
        let req = validate_quote_request(body, &self.registry)?;
        self.engine(req.chain_id)?.quote(&req).await
    }

    /// Resolve pair addresses for a batch of token pairs, in request order.
    pub async fn pair_addresses(
        &self,
        req: &PairAddressesRequest,
    ) -> Result<Vec<PairAddressEntry>, QuoteError> {
        let engine = self.engine(req.chain_id)?;
        let pairs = req
            .tokens
            .iter()
            .map(|[a, b]| Ok((a.parse_address()?, b.parse_address()?)))
            .collect::<Result<Vec<_>, QuoteError>>()?;
        let addresses = engine.pair_addresses(&pairs).await?;
        Ok(pairs
            .iter()
            .zip(addresses)
            .map(|((a, b), pair)| PairAddressEntry {
                tokens: [checksum(*a), checksum(*b)],
                liquidity_token: checksum(pair),
            })
            .collect())
    }
}

/// Token reference in a pair lookup: a bare address or an SDK token object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PairToken {
    Address(String),
    Token {
        address: Option<String>,
        #[serde(rename = "_checksummedAddress")]
        checksummed_address: Option<String>,
    },
}

impl PairToken {
    fn parse_address(&self) -> Result<Address, QuoteError> {
        let raw = match self {
            Self::Address(raw) => Some(raw.as_str()),
            Self::Token {
                address,
                checksummed_address,
            } => address.as_deref().or(checksummed_address.as_deref()),
        }
        .ok_or_else(|| QuoteError::invalid("token without address"))?;
        raw.trim()
            .parse()
            .map_err(|_| QuoteError::invalid(format!("invalid token address {raw:?}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairAddressesRequest {
    pub chain_id: u64,
    pub tokens: Vec<[PairToken; 2]>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairAddressEntry {
    pub tokens: [String; 2],
    pub liquidity_token: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error mapped to its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        let status = match err {
            QuoteError::InvalidRequest(_) | QuoteError::NoRouteFound => StatusCode::BAD_REQUEST,
            QuoteError::LedgerUnavailable(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<DeadlineExceeded> for ApiError {
    fn from(err: DeadlineExceeded) -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Create the HTTP router with API endpoints
pub fn create_api_router(router: Arc<Router>) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_text))
        .route("/quote", post(quote_route))
        .route("/api/v1/quote", post(quote_route))
        .route("/api/v1/pair_addresses", post(pair_addresses_route))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(router)
}

/// Health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn metrics_text() -> String {
    metrics::render()
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, QuoteError> {
    let body: &[u8] = if body.is_empty() { b"{}" } else { body };
    serde_json::from_slice(body).map_err(|e| QuoteError::invalid(format!("malformed body: {e}")))
}

/// Quote endpoint - prices the request and returns the classic quote payload
async fn quote_route(
    State(router): State<Arc<Router>>,
    body: Bytes,
) -> Result<Json<ClassicQuoteResponse>, ApiError> {
    let req: QuoteRequestBody =
        parse_body(&body).inspect_err(|err| record("unknown", err.outcome()))?;
    let chain_label = router.chain_label(req.token_in_chain_id);

    let outcome = router.admission.run(router.quote(&req)).await;
    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            record(&chain_label, err.outcome());
            debug!(chain = %chain_label, error = %err, "quote rejected");
            return Err(err.into());
        }
        Err(elapsed) => {
            record(&chain_label, "timeout");
            return Err(elapsed.into());
        }
    };

    record(&chain_label, "ok");
    let response = QuoteResponseBuilder::build(&result);
    info!(
        stage = %QuoteStage::Responded,
        chain = %chain_label,
        legs = result.route.len(),
        quote = %result.amount_out,
        "quote served"
    );
    Ok(Json(response))
}

/// Batch pair address lookup endpoint
async fn pair_addresses_route(
    State(router): State<Arc<Router>>,
    body: Bytes,
) -> Result<Json<Vec<PairAddressEntry>>, ApiError> {
    let req: PairAddressesRequest = parse_body(&body)?;
    let entries = router
        .admission
        .run(router.pair_addresses(&req))
        .await??;
    Ok(Json(entries))
}

fn record(chain: &str, outcome: &str) {
    QUOTE_OUTCOMES.with_label_values(&[chain, outcome]).inc();
}
