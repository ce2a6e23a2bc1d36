use std::sync::Arc;

use anyhow::Context;

use ecoblock_service::{InventoryService, ServiceConfig};

const ENV_BIND_ADDR: &str = "ECOBLOCK_BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ecoblock_observability::init();

    let config = ServiceConfig::from_env();
    tracing::info!(?config, "starting ecoblock api");

    let service = InventoryService::in_memory(&config).context("invalid service configuration")?;
    let app = ecoblock_api::app::build_app(Arc::new(service));

    let addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
