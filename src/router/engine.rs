// Quote engine - per-chain orchestration of one quote request
// Normalizes native-currency aliases, generates candidates, prices them,
// selects the winner and attaches informational chain metadata
//
// Numan Thabit 2025 Nov

use crate::config::ChainSettings;
use crate::errors::{LedgerError, QuoteError};
use crate::router::candidates::generate_candidates;
use crate::router::pricer::PathPricer;
use crate::router::routes::{CandidatePath, PricedCandidate, QuoteResult, TokenDescriptor};
use crate::router::selector::RouteSelector;
use crate::router::validation::{QuoteRequest, RequestedToken};
use crate::venues::ledger::LedgerQuery;
use ethers::types::{Address, U256};
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-request lifecycle, reported on tracing events as `stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStage {
    Received,
    Normalized,
    CandidatesGenerated,
    Pricing,
    Selected,
    NoRoute,
    Responded,
    Error,
}

impl fmt::Display for QuoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "RECEIVED",
            Self::Normalized => "NORMALIZED",
            Self::CandidatesGenerated => "CANDIDATES_GENERATED",
            Self::Pricing => "PRICING",
            Self::Selected => "SELECTED",
            Self::NoRoute => "NO_ROUTE",
            Self::Responded => "RESPONDED",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Quote engine bound to one chain's configuration and ledger.
#[derive(Clone)]
pub struct QuoteEngine {
    chain: Arc<ChainSettings>,
    ledger: Arc<dyn LedgerQuery>,
    concurrent_pricing: bool,
}

impl QuoteEngine {
    pub fn new(chain: Arc<ChainSettings>, ledger: Arc<dyn LedgerQuery>) -> Self {
        Self {
            chain,
            ledger,
            concurrent_pricing: false,
        }
    }

    /// Price candidates concurrently; selection still runs in priority order.
    pub fn with_concurrent_pricing(mut self, enabled: bool) -> Self {
        self.concurrent_pricing = enabled;
        self
    }

    /// Replace native-currency aliases with the wrapped-native token.
    pub fn normalize(&self, token: RequestedToken) -> Address {
        match token {
            RequestedToken::Native => self.chain.wrapped_native.address,
            RequestedToken::Erc20(address) => address,
        }
    }

    #[tracing::instrument(skip_all, fields(chain_id = self.chain.chain_id, amount = %req.amount))]
    pub async fn quote(&self, req: &QuoteRequest) -> Result<QuoteResult, QuoteError> {
        debug!(stage = %QuoteStage::Received, "quote request");

        let token_in = self.normalize(req.token_in);
        let token_out = self.normalize(req.token_out);
        if token_in == token_out {
            return Err(QuoteError::invalid("tokenIn and tokenOut must differ"));
        }
        debug!(
            stage = %QuoteStage::Normalized,
            token_in = ?token_in,
            token_out = ?token_out,
            "tokens normalized"
        );

        let (token_in, token_out) = futures::try_join!(
            self.describe(token_in),
            self.describe(token_out)
        )
        .map_err(|err| self.ledger_failure(err))?;

        let candidates = generate_candidates(&token_in, &token_out, &self.chain.bridge_tokens);
        debug!(
            stage = %QuoteStage::CandidatesGenerated,
            candidates = candidates.len(),
            "candidates generated"
        );

        debug!(
            stage = %QuoteStage::Pricing,
            concurrent = self.concurrent_pricing,
            "pricing candidates"
        );
        let priced = self
            .price_all(&candidates, req.amount)
            .await
            .map_err(|err| self.ledger_failure(err))?;

        let selection = match RouteSelector::select(priced) {
            Ok(selection) => selection,
            Err(err) => {
                info!(
                    stage = %QuoteStage::NoRoute,
                    token_in = %token_in,
                    token_out = %token_out,
                    "no feasible route"
                );
                return Err(err);
            }
        };
        info!(
            stage = %QuoteStage::Selected,
            route = %selection.best,
            amount_out = %selection.best.amount_out(),
            alternatives = selection.alternatives.len(),
            "selected best route"
        );

        let (block_number, gas_price_wei) = futures::try_join!(
            self.ledger.get_block_number(),
            self.ledger.get_gas_price_wei()
        )
        .map_err(|err| self.ledger_failure(err))?;

        let route = selection.best;
        Ok(QuoteResult {
            amount_in: req.amount,
            amount_out: route.amount_out(),
            route,
            block_number,
            gas_price_wei,
        })
    }

    async fn describe(&self, address: Address) -> Result<TokenDescriptor, LedgerError> {
        let meta = self.ledger.get_token_metadata(address).await?;
        Ok(TokenDescriptor::new(
            self.chain.chain_id,
            address,
            meta.decimals,
            meta.symbol,
        ))
    }

    async fn price_all(
        &self,
        candidates: &[CandidatePath],
        amount_in: U256,
    ) -> Result<Vec<PricedCandidate>, LedgerError> {
        let pricer = PathPricer::new(self.ledger.as_ref(), self.chain.factory, self.chain.router);
        if self.concurrent_pricing {
            // try_join_all keeps input order, so selection is unaffected by completion order.
            return try_join_all(candidates.iter().map(|c| pricer.price(c, amount_in))).await;
        }
        let mut priced = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            priced.push(pricer.price(candidate, amount_in).await?);
        }
        Ok(priced)
    }

    /// Batch pair lookup in request order.
    pub async fn pair_addresses(
        &self,
        pairs: &[(Address, Address)],
    ) -> Result<Vec<Address>, QuoteError> {
        self.ledger
            .resolve_pairs(self.chain.factory, self.chain.pair_reader, pairs)
            .await
            .map_err(|err| self.ledger_failure(err))
    }

    fn ledger_failure(&self, err: LedgerError) -> QuoteError {
        warn!(stage = %QuoteStage::Error, chain_id = self.chain.chain_id, error = %err, "ledger query failed");
        QuoteError::LedgerUnavailable(err)
    }
}
