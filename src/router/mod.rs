// Router module - route discovery and quote plane
// This file wires candidate generation, path pricing and route selection
// into the per-chain quote engine and its HTTP surface
//
// Numan Thabit 2025 Nov

pub mod candidates;
pub mod engine;
pub mod pricer;
pub mod response;
pub mod routes;
pub mod selector;
pub mod validation;

#[allow(clippy::module_inception)]
pub mod router;

pub use candidates::generate_candidates;
pub use engine::{QuoteEngine, QuoteStage};
pub use pricer::PathPricer;
pub use response::{ClassicQuoteResponse, QuoteResponseBuilder};
pub use router::Router;
pub use routes::{CandidatePath, PricedCandidate, QuoteResult, RouteLeg, RoutePath, TokenDescriptor};
pub use selector::{RouteSelection, RouteSelector};
pub use validation::{validate_quote_request, QuoteRequest, QuoteRequestBody};
