// Path pricer - prices one candidate path against the ledger
// Checks that every hop has a deployed pair, asks the router for the per-hop
// amounts of the whole path, and snapshots reserves for each leg
//
// Numan Thabit 2025 Nov

use crate::errors::LedgerError;
use crate::router::routes::{CandidatePath, PricedCandidate, Reserve, RouteLeg, RoutePath, TokenDescriptor};
use crate::venues::ledger::LedgerQuery;
use ethers::types::{Address, U256};
use tracing::debug;

/// Prices candidates for one factory/router deployment.
pub struct PathPricer<'a> {
    ledger: &'a dyn LedgerQuery,
    factory: Address,
    router: Address,
}

impl<'a> PathPricer<'a> {
    pub fn new(ledger: &'a dyn LedgerQuery, factory: Address, router: Address) -> Self {
        Self {
            ledger,
            factory,
            router,
        }
    }

    /// Price `candidate` for an exact input of `amount_in`.
    ///
    /// A missing pair yields `PricedCandidate::Infeasible` and stops pricing;
    /// ledger failures are returned as errors.
    pub async fn price(
        &self,
        candidate: &CandidatePath,
        amount_in: U256,
    ) -> Result<PricedCandidate, LedgerError> {
        let tokens = candidate.tokens();
        let mut pools = Vec::with_capacity(tokens.len() - 1);
        for hop in tokens.windows(2) {
            let pool = self
                .ledger
                .resolve_pair(self.factory, hop[0].address, hop[1].address)
                .await?;
            if pool.is_zero() {
                debug!(
                    candidate = %candidate,
                    token_a = %hop[0],
                    token_b = %hop[1],
                    "no pair deployed; candidate infeasible"
                );
                return Ok(PricedCandidate::Infeasible {
                    token_a: hop[0].address,
                    token_b: hop[1].address,
                });
            }
            pools.push(pool);
        }

        let path = candidate.addresses();
        let amounts = self
            .ledger
            .simulate_amounts_out(self.router, amount_in, &path)
            .await?;
        if amounts.len() != path.len() || amounts[0] != amount_in {
            return Err(LedgerError::Decode(format!(
                "getAmountsOut returned {} amounts for a {}-token path starting at {}",
                amounts.len(),
                path.len(),
                amounts.first().copied().unwrap_or_default()
            )));
        }

        let mut legs = Vec::with_capacity(pools.len());
        for (i, pool) in pools.into_iter().enumerate() {
            legs.push(
                self.leg(pool, &tokens[i], &tokens[i + 1], amounts[i], amounts[i + 1])
                    .await?,
            );
        }

        let route = RoutePath::new(legs)
            .ok_or_else(|| LedgerError::Decode(format!("inconsistent legs for {candidate}")))?;
        debug!(
            candidate = %candidate,
            amount_out = %route.amount_out(),
            "priced candidate"
        );
        Ok(PricedCandidate::Feasible(route))
    }

    async fn leg(
        &self,
        pool: Address,
        token_in: &TokenDescriptor,
        token_out: &TokenDescriptor,
        amount_in: U256,
        amount_out: U256,
    ) -> Result<RouteLeg, LedgerError> {
        let (reserves, token0) = futures::try_join!(
            self.ledger.get_reserves(pool),
            self.ledger.get_token0(pool)
        )?;

        let (first, second) = if token0 == token_in.address {
            (token_in, token_out)
        } else if token0 == token_out.address {
            (token_out, token_in)
        } else {
            return Err(LedgerError::Decode(format!(
                "pair {pool:?} token0 {token0:?} matches neither {token_in} nor {token_out}"
            )));
        };

        Ok(RouteLeg {
            pool,
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            reserve0: Reserve {
                token: first.clone(),
                quotient: reserves.reserve0,
            },
            reserve1: Reserve {
                token: second.clone(),
                quotient: reserves.reserve1,
            },
            amount_in,
            amount_out,
        })
    }
}
