// Library root module for v2-quoter
// This file defines the public API and module structure for the v2-quoter library
// It exports the quote engine, the ledger adapters and the HTTP router
//
// Numan Thabit 2025 Nov

pub mod config;
pub mod control;
pub mod errors;
pub mod metrics;
pub mod router;
pub mod transport;
pub mod venues;
