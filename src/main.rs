use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use v2_quoter::config::AppConfig;
use v2_quoter::control::AdmissionControl;
use v2_quoter::errors::LedgerError;
use v2_quoter::router::router::create_api_router;
use v2_quoter::router::Router;
use v2_quoter::transport::jsonrpc::JsonRpc;
use v2_quoter::venues::ledger::LedgerQuery;
use v2_quoter::venues::uniswap_v2::EvmLedger;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal quoter error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;
    let registry = config.chain_registry().context("load chain table")?;
    let listen_addr = config.listen_addr()?;
    let ledger_timeout = config.ledger_timeout();

    for chain in registry.iter() {
        info!(
            chain_id = chain.chain_id,
            name = %chain.name,
            rpc = %chain.rpc_url,
            factory = ?chain.factory,
            router = ?chain.router,
            bridges = chain.bridge_tokens.len(),
            "chain configured"
        );
    }

    let admission = AdmissionControl::new(config.max_inflight(), config.request_timeout());
    let router = Router::new(registry, admission, |chain| {
        let rpc = JsonRpc::new(chain.rpc_url.as_str(), ledger_timeout)?;
        Ok::<Arc<dyn LedgerQuery>, LedgerError>(Arc::new(EvmLedger::new(rpc)))
    })
    .context("initialize ledger clients")?
    .with_concurrent_pricing(config.concurrent_pricing());
    let router = Arc::new(router);

    let api_router = create_api_router(router);
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("bind API server address {listen_addr}"))?;

    info!(
        address = %listen_addr,
        max_inflight = config.max_inflight(),
        request_timeout_ms = config.request_timeout().as_millis() as u64,
        ledger_timeout_ms = ledger_timeout.as_millis() as u64,
        concurrent_pricing = config.concurrent_pricing(),
        "quote API online"
    );

    axum::serve(listener, api_router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl_c listener error");
    }
    info!("Shutdown signal received, exiting");
}

fn init_tracing() -> Result<()> {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn,reqwest=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
