// Transport layer
// JSON-RPC client for the EVM execution node
//
// Numan Thabit 2025 Nov

pub mod jsonrpc;
