//! finsight server binary
//!
//! Wires the language-model provider, the capability registry and the
//! market adapters into the HTTP pipeline and serves it.

use anyhow::Context;
use clap::Parser;
use finsight_capabilities::{CapabilityRegistry, Dispatcher};
use finsight_llm::providers::OpenAiChatModel;
use finsight_market::{MarketConfig, MarketContext, capabilities};
use finsight_server::{AppState, Orchestrator, StoreProvider, router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Conversational financial-assistant backend
#[derive(Debug, Parser)]
#[command(name = "finsight-server", version, about)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3035)]
    port: u16,

    /// Model identifier for both model turns
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let model = OpenAiChatModel::from_env().context("model provider configuration")?;

    let market_config = MarketConfig::default().with_env_credentials();
    let market = MarketContext::new(market_config).context("market adapters")?;

    let registry = Arc::new(CapabilityRegistry::new());
    capabilities::install(&registry, &market);
    info!(capabilities = registry.len(), "capability registry ready");

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(model),
        Dispatcher::new(registry),
        args.model,
    ));

    let state = AppState {
        orchestrator,
        stores: Arc::new(StoreProvider::new()),
        debug: std::env::var("FINSIGHT_DEBUG").is_ok(),
    };

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "finsight server listening");

    axum::serve(listener, router(state))
        .await
        .context("server loop")?;

    Ok(())
}
