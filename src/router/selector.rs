// Route selector - chooses the route with the largest exact-input output
// Folds priced candidates in priority order; a later candidate only replaces
// the current best on a strictly greater amount out
//
// Numan Thabit 2025 Nov

use crate::errors::QuoteError;
use crate::router::routes::{PricedCandidate, RoutePath};

/// Route selection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSelection {
    pub best: RoutePath,
    /// Other feasible routes, in priority order
    pub alternatives: Vec<RoutePath>,
}

pub struct RouteSelector;

impl RouteSelector {
    /// Reduce priced candidates (given in generator priority order) to a winner.
    ///
    /// Comparison is on `U256` amounts, so ties keep the earliest candidate.
    pub fn select(priced: Vec<PricedCandidate>) -> Result<RouteSelection, QuoteError> {
        let mut feasible: Vec<RoutePath> = priced
            .into_iter()
            .filter_map(PricedCandidate::into_route)
            .collect();

        let best_idx = feasible
            .iter()
            .enumerate()
            .fold(None::<usize>, |best, (idx, candidate)| match best {
                Some(b) if candidate.amount_out() <= feasible[b].amount_out() => Some(b),
                _ => Some(idx),
            })
            .ok_or(QuoteError::NoRouteFound)?;

        let best = feasible.remove(best_idx);
        Ok(RouteSelection {
            best,
            alternatives: feasible,
        })
    }
}
